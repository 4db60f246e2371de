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

use std::fmt;

/// Product known to the patch catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AruProduct {
    Wls,
    Coh,
    Fmwplat,
    Fit,
    Jdbc,
    Jrf,
    Jdev,
    Opss,
    Owsm,
    Osb,
    Soa,
    Mft,
    Idm,
    Oam,
    Ohs,
    Oss,
    Odi,
    Oud,
    Oid,
    Wcc,
    Wcp,
    Wcs,
}

impl AruProduct {
    pub const ALL: [AruProduct; 22] = [
        AruProduct::Wls,
        AruProduct::Coh,
        AruProduct::Fmwplat,
        AruProduct::Fit,
        AruProduct::Jdbc,
        AruProduct::Jrf,
        AruProduct::Jdev,
        AruProduct::Opss,
        AruProduct::Owsm,
        AruProduct::Osb,
        AruProduct::Soa,
        AruProduct::Mft,
        AruProduct::Idm,
        AruProduct::Oam,
        AruProduct::Ohs,
        AruProduct::Oss,
        AruProduct::Odi,
        AruProduct::Oud,
        AruProduct::Oid,
        AruProduct::Wcc,
        AruProduct::Wcp,
        AruProduct::Wcs,
    ];

    /// Code used in installed-product inventories, e.g. `WLS`.
    pub fn code(&self) -> &'static str {
        match self {
            AruProduct::Wls => "WLS",
            AruProduct::Coh => "COH",
            AruProduct::Fmwplat => "FMWPLAT",
            AruProduct::Fit => "FIT",
            AruProduct::Jdbc => "JDBC",
            AruProduct::Jrf => "JRF",
            AruProduct::Jdev => "JDEV",
            AruProduct::Opss => "OPSS",
            AruProduct::Owsm => "OWSM",
            AruProduct::Osb => "OSB",
            AruProduct::Soa => "SOA",
            AruProduct::Mft => "MFT",
            AruProduct::Idm => "IDM",
            AruProduct::Oam => "OAM",
            AruProduct::Ohs => "OHS",
            AruProduct::Oss => "OSS",
            AruProduct::Odi => "ODI",
            AruProduct::Oud => "OUD",
            AruProduct::Oid => "OID",
            AruProduct::Wcc => "WCC",
            AruProduct::Wcp => "WCP",
            AruProduct::Wcs => "WCS",
        }
    }

    /// Numeric product id used in catalog queries.
    pub fn product_id(&self) -> &'static str {
        match self {
            AruProduct::Wls => "15991",
            AruProduct::Coh => "13964",
            AruProduct::Fmwplat => "27638",
            AruProduct::Fit => "33256",
            AruProduct::Jdbc => "13891",
            AruProduct::Jrf => "10120",
            AruProduct::Jdev => "11281",
            AruProduct::Opss => "16606",
            AruProduct::Owsm => "12787",
            AruProduct::Osb => "16011",
            AruProduct::Soa => "12745",
            AruProduct::Mft => "27169",
            AruProduct::Idm => "18391",
            AruProduct::Oam => "18388",
            AruProduct::Ohs => "10600",
            AruProduct::Oss => "16678",
            AruProduct::Odi => "13724",
            AruProduct::Oud => "19748",
            AruProduct::Oid => "10040",
            AruProduct::Wcc => "13946",
            AruProduct::Wcp => "15224",
            AruProduct::Wcs => "18112",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AruProduct::Wls => "Oracle WebLogic Server",
            AruProduct::Coh => "Oracle Coherence",
            AruProduct::Fmwplat => "Oracle Fusion Middleware Platform",
            AruProduct::Fit => "Fusion Middleware Infrastructure Tools",
            AruProduct::Jdbc => "Oracle JDBC",
            AruProduct::Jrf => "Oracle Java Required Files",
            AruProduct::Jdev => "Oracle JDeveloper",
            AruProduct::Opss => "Oracle Platform Security Services",
            AruProduct::Owsm => "Oracle Web Services Manager",
            AruProduct::Osb => "Oracle Service Bus",
            AruProduct::Soa => "Oracle SOA Suite",
            AruProduct::Mft => "Oracle Managed File Transfer",
            AruProduct::Idm => "Oracle Identity Manager",
            AruProduct::Oam => "Oracle Access Manager",
            AruProduct::Ohs => "Oracle HTTP Server",
            AruProduct::Oss => "Oracle Security Service",
            AruProduct::Odi => "Oracle Data Integrator",
            AruProduct::Oud => "Oracle Unified Directory",
            AruProduct::Oid => "Oracle Internet Directory",
            AruProduct::Wcc => "Oracle WebCenter Content",
            AruProduct::Wcp => "Oracle WebCenter Portal",
            AruProduct::Wcs => "Oracle WebCenter Sites",
        }
    }

    /// Map an inventory code onto a catalog product. `INFRA` is the older
    /// name for `JRF`; codes the catalog does not know return `None`.
    pub fn from_inventory_code(code: &str) -> Option<Self> {
        let code = code.trim().to_uppercase();
        let code = if code == "INFRA" { "JRF".to_string() } else { code };
        AruProduct::ALL
            .into_iter()
            .find(|product| product.code() == code)
    }

    /// Products that never show up in installed-product inventories.
    pub fn is_platform_only(&self) -> bool {
        matches!(self, AruProduct::Fmwplat | AruProduct::Jdev)
    }
}

impl fmt::Display for AruProduct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
