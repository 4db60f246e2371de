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
use crate::installer::{AruProduct, InstallerType};
use crate::version::Version;
use log::debug;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Product bundle a user asks for, e.g. `WLS` or `SOA_OSB`.
///
/// Variants are declared in lookup order: [`FmwInstallerType::derive_type`]
/// returns the first bundle whose products match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FmwInstallerType {
    Wls,
    WlsSlim,
    WlsDev,
    Fmw,
    Osb,
    Soa,
    SoaOsb,
    SoaOsbB2b,
    Mft,
    Idm,
    IdmWls,
    Oam,
    Ohs,
    Odi,
    Oud,
    OudWls,
    Oid,
    Wcc,
    Wcp,
    Wcs,
}

/// Products a bundle builds on before adding its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BaseProducts {
    None,
    Wls,
    Fmw,
}

type InstallerOverride = fn(&Version, &mut Vec<InstallerType>);

struct BundleDefinition {
    name: &'static str,
    base: BaseProducts,
    products: &'static [AruProduct],
    installers: &'static [InstallerType],
    version_override: Option<InstallerOverride>,
}

const WLS_PRODUCTS: &[AruProduct] = &[
    AruProduct::Wls,
    AruProduct::Coh,
    AruProduct::Fmwplat,
    AruProduct::Fit,
    AruProduct::Jdbc,
];

const FMW_PRODUCTS: &[AruProduct] = &[
    AruProduct::Jrf,
    AruProduct::Jdev,
    AruProduct::Opss,
    AruProduct::Owsm,
];

static OHS_DB19_DROPPED_FROM: LazyLock<Version> =
    LazyLock::new(|| Version::new(vec![14, 1, 2, 0, 0]));

/// OHS 14.1.2 and later no longer ship a separate database client installer.
fn ohs_installers(version: &Version, installers: &mut Vec<InstallerType>) {
    if version.is_at_least(&OHS_DB19_DROPPED_FROM) {
        installers.retain(|installer| *installer != InstallerType::Db19);
    }
}

impl FmwInstallerType {
    pub const ALL: [FmwInstallerType; 20] = [
        FmwInstallerType::Wls,
        FmwInstallerType::WlsSlim,
        FmwInstallerType::WlsDev,
        FmwInstallerType::Fmw,
        FmwInstallerType::Osb,
        FmwInstallerType::Soa,
        FmwInstallerType::SoaOsb,
        FmwInstallerType::SoaOsbB2b,
        FmwInstallerType::Mft,
        FmwInstallerType::Idm,
        FmwInstallerType::IdmWls,
        FmwInstallerType::Oam,
        FmwInstallerType::Ohs,
        FmwInstallerType::Odi,
        FmwInstallerType::Oud,
        FmwInstallerType::OudWls,
        FmwInstallerType::Oid,
        FmwInstallerType::Wcc,
        FmwInstallerType::Wcp,
        FmwInstallerType::Wcs,
    ];

    fn definition(self) -> BundleDefinition {
        use AruProduct as P;
        use InstallerType as I;

        let (name, base, products, installers): (
            &'static str,
            BaseProducts,
            &'static [AruProduct],
            &'static [InstallerType],
        ) = match self {
            FmwInstallerType::Wls => ("WLS", BaseProducts::Wls, &[], &[I::Wls]),
            FmwInstallerType::WlsSlim => ("WLSSLIM", BaseProducts::Wls, &[], &[I::WlsSlim]),
            FmwInstallerType::WlsDev => ("WLSDEV", BaseProducts::Wls, &[], &[I::WlsDev]),
            FmwInstallerType::Fmw => ("FMW", BaseProducts::Fmw, &[], &[I::Fmw]),
            FmwInstallerType::Osb => ("OSB", BaseProducts::Fmw, &[P::Osb], &[I::Fmw, I::Osb]),
            FmwInstallerType::Soa => ("SOA", BaseProducts::Fmw, &[P::Soa], &[I::Fmw, I::Soa]),
            FmwInstallerType::SoaOsb => (
                "SOA_OSB",
                BaseProducts::Fmw,
                &[P::Soa, P::Osb],
                &[I::Fmw, I::Soa, I::Osb],
            ),
            FmwInstallerType::SoaOsbB2b => (
                "SOA_OSB_B2B",
                BaseProducts::Fmw,
                &[P::Soa, P::Osb],
                &[I::Fmw, I::Soa, I::Osb, I::B2b],
            ),
            FmwInstallerType::Mft => ("MFT", BaseProducts::Fmw, &[P::Mft], &[I::Fmw, I::Mft]),
            FmwInstallerType::Idm => ("IDM", BaseProducts::Fmw, &[P::Idm], &[I::Fmw, I::Idm]),
            FmwInstallerType::IdmWls => ("IDM_WLS", BaseProducts::None, &[P::Idm], &[I::Idm]),
            FmwInstallerType::Oam => ("OAM", BaseProducts::Fmw, &[P::Oam], &[I::Fmw, I::Oam]),
            FmwInstallerType::Ohs => (
                "OHS",
                BaseProducts::None,
                &[P::Ohs, P::Wls, P::Jdbc, P::Fmwplat, P::Oss, P::Fit],
                &[I::Ohs, I::Db19],
            ),
            FmwInstallerType::Odi => ("ODI", BaseProducts::None, &[P::Odi], &[I::Odi]),
            FmwInstallerType::Oud => ("OUD", BaseProducts::None, &[P::Oud], &[I::Oud]),
            FmwInstallerType::OudWls => ("OUD_WLS", BaseProducts::Fmw, &[P::Oud], &[I::Fmw, I::Oud]),
            FmwInstallerType::Oid => ("OID", BaseProducts::Fmw, &[P::Oid], &[I::Fmw, I::Oid]),
            FmwInstallerType::Wcc => ("WCC", BaseProducts::Fmw, &[P::Wcc], &[I::Fmw, I::Wcc]),
            FmwInstallerType::Wcp => ("WCP", BaseProducts::Fmw, &[P::Wcp], &[I::Fmw, I::Wcp]),
            FmwInstallerType::Wcs => ("WCS", BaseProducts::Fmw, &[P::Wcs], &[I::Fmw, I::Wcs]),
        };

        let version_override: Option<InstallerOverride> = match self {
            FmwInstallerType::Ohs => Some(ohs_installers),
            _ => None,
        };

        BundleDefinition {
            name,
            base,
            products,
            installers,
            version_override,
        }
    }

    pub fn name(&self) -> &'static str {
        self.definition().name
    }

    /// Catalog products whose patches apply to this bundle.
    pub fn products(&self) -> BTreeSet<AruProduct> {
        let definition = self.definition();
        let base: &[AruProduct] = match definition.base {
            BaseProducts::None => &[],
            BaseProducts::Wls => WLS_PRODUCTS,
            BaseProducts::Fmw => WLS_PRODUCTS,
        };
        let fmw: &[AruProduct] = match definition.base {
            BaseProducts::Fmw => FMW_PRODUCTS,
            _ => &[],
        };

        base.iter()
            .chain(fmw)
            .chain(definition.products)
            .copied()
            .collect()
    }

    /// Installers in the order they are laid down in the image.
    pub fn installers(&self) -> Vec<InstallerType> {
        self.definition().installers.to_vec()
    }

    /// Installers for a specific product version, after any version-specific
    /// adjustment of the bundle.
    pub fn installers_for_version(&self, version: &str) -> Result<Vec<InstallerType>> {
        let definition = self.definition();
        let mut installers = definition.installers.to_vec();
        if let Some(adjust) = definition.version_override {
            let parsed = Version::from_str(version)?;
            adjust(&parsed, &mut installers);
        }
        Ok(installers)
    }

    /// Products compared against an installed-product inventory.
    fn inventory_products(&self) -> BTreeSet<AruProduct> {
        self.products()
            .into_iter()
            .filter(|product| !product.is_platform_only())
            .collect()
    }

    /// Work out which bundle produced an inventory, given its comma-separated
    /// product codes. Falls back to [`FmwInstallerType::Wls`] when nothing
    /// matches.
    pub fn derive_type(product_list: &str) -> FmwInstallerType {
        let products: BTreeSet<AruProduct> = product_list
            .split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .filter_map(|code| {
                let product = AruProduct::from_inventory_code(code);
                if product.is_none() {
                    debug!("Ignoring unknown product code {code}");
                }
                product
            })
            .collect();

        let derived = FmwInstallerType::ALL
            .into_iter()
            .find(|bundle| bundle.inventory_products() == products)
            .unwrap_or(FmwInstallerType::Wls);
        debug!("Derived installer type {derived} from products [{product_list}]");
        derived
    }
}

impl FromStr for FmwInstallerType {
    type Err = ImageToolError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_uppercase().replace('-', "_");
        FmwInstallerType::ALL
            .into_iter()
            .find(|bundle| bundle.name() == wanted)
            .ok_or_else(|| ImageToolError::UnknownInstallerType(s.to_string()))
    }
}

impl fmt::Display for FmwInstallerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
