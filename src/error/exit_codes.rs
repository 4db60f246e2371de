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

use crate::error::ImageToolError;

pub fn get_exit_code(error: &ImageToolError) -> i32 {
    match error {
        ImageToolError::InvalidVersionFormat(_)
        | ImageToolError::InvalidPatchIdFormat(_)
        | ImageToolError::InvalidConfig(_)
        | ImageToolError::UnknownInstallerType(_)
        | ImageToolError::UnsupportedArchitecture(_) => 2,

        ImageToolError::PatchVersionNotFound { .. }
        | ImageToolError::MultiplePatchVersions { .. } => 3,

        ImageToolError::NotFound { .. } => 4,

        ImageToolError::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied => 13,

        ImageToolError::CatalogUnavailable(_)
        | ImageToolError::Http(_)
        | ImageToolError::Download(_) => 20,

        ImageToolError::InvalidCredentials(_) => 21,

        ImageToolError::CacheStoreIo(_) | ImageToolError::LockingTimeout { .. } => 74,

        _ => 1,
    }
}
