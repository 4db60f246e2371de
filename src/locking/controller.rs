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
use crate::locking::handle::LockHandle;
use crate::platform::file_ops::prepare_lock_file;
use log::debug;
use std::fs::{File, TryLockError};
use std::io;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

/// Acquires exclusive advisory locks on a single lock file, polling until a
/// configured timeout elapses.
#[derive(Debug, Clone)]
pub struct LockController {
    lock_path: PathBuf,
    timeout: Duration,
    retry_delay: Duration,
}

impl LockController {
    pub fn new<P: Into<PathBuf>>(lock_path: P, timeout: Duration) -> Self {
        Self {
            lock_path: lock_path.into(),
            timeout,
            retry_delay: Duration::from_millis(50),
        }
    }

    pub fn acquire(&self) -> Result<LockHandle> {
        let file = prepare_lock_file(&self.lock_path).map_err(|err| {
            ImageToolError::CacheStoreIo(format!(
                "Failed to open lock file {}: {err}",
                self.lock_path.display()
            ))
        })?;

        let acquisition_start = Instant::now();

        loop {
            match try_lock(&file) {
                Ok(()) => {
                    debug!(
                        "Acquired lock {} after {:.3}s",
                        self.lock_path.display(),
                        acquisition_start.elapsed().as_secs_f64()
                    );
                    return Ok(LockHandle::new(
                        self.lock_path.clone(),
                        file,
                        acquisition_start,
                    ));
                }
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                    let waited = acquisition_start.elapsed();
                    if waited >= self.timeout {
                        return Err(ImageToolError::LockingTimeout {
                            path: self.lock_path.display().to_string(),
                            waited_secs: waited.as_secs_f64(),
                        });
                    }

                    thread::sleep(self.retry_delay);
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    return Err(ImageToolError::CacheStoreIo(format!(
                        "Failed to lock {}: {err}",
                        self.lock_path.display()
                    )));
                }
            }
        }
    }
}

fn try_lock(file: &File) -> io::Result<()> {
    match file.try_lock() {
        Ok(()) => Ok(()),
        Err(TryLockError::WouldBlock) => Err(io::Error::new(
            io::ErrorKind::WouldBlock,
            "lock would block",
        )),
        Err(TryLockError::Error(err)) => Err(err),
    }
}
