// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::error::{ImageToolError, Result};
use log::{debug, warn};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Handle for an advisory lock backed by `std::fs::File`. The lock is released
/// on [`LockHandle::release`] or when the handle is dropped.
#[derive(Debug)]
pub struct LockHandle {
    path: PathBuf,
    file: Option<File>,
    acquired_at: Instant,
}

impl LockHandle {
    pub(crate) fn new(path: PathBuf, file: File, acquired_at: Instant) -> Self {
        Self {
            path,
            file: Some(file),
            acquired_at,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn release(mut self) -> Result<()> {
        self.release_inner()
    }

    fn release_inner(&mut self) -> Result<()> {
        let Some(file) = self.file.take() else {
            return Ok(());
        };

        file.unlock().map_err(|err| {
            ImageToolError::CacheStoreIo(format!(
                "Failed to release lock {}: {err}",
                self.path.display()
            ))
        })?;
        debug!(
            "Released lock {} after {:.3}s",
            self.path.display(),
            self.acquired_at.elapsed().as_secs_f64()
        );
        Ok(())
    }
}

impl Drop for LockHandle {
    fn drop(&mut self) {
        if let Err(err) = self.release_inner() {
            warn!("{err}");
        }
    }
}
