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

use crate::aru::xml::{children, parse_results};
use crate::error::Result;
use crate::installer::AruProduct;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub id: String,
    pub name: String,
    pub product_ids: Vec<String>,
}

/// Every release the catalog knows, used to turn a product and version into
/// a release id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseCatalog {
    releases: Vec<Release>,
}

impl ReleaseCatalog {
    pub fn new(releases: Vec<Release>) -> Self {
        Self { releases }
    }

    pub fn releases(&self) -> &[Release] {
        &self.releases
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }

    pub fn release_id(&self, product: AruProduct, version: &str) -> Option<&str> {
        self.releases
            .iter()
            .find(|release| {
                release.name == version
                    && release
                        .product_ids
                        .iter()
                        .any(|id| id == product.product_id())
            })
            .map(|release| release.id.as_str())
    }
}

pub fn parse_releases(body: &str) -> Result<ReleaseCatalog> {
    let Some(document) = parse_results(body)? else {
        return Ok(ReleaseCatalog::default());
    };

    let releases = children(document.root_element(), "release")
        .filter_map(|node| {
            let id = node.attribute("id")?.to_string();
            let name = node.attribute("name")?.to_string();
            let product_ids = children(node, "product")
                .filter_map(|product| product.attribute("id"))
                .map(str::to_string)
                .collect();
            Some(Release {
                id,
                name,
                product_ids,
            })
        })
        .collect();

    Ok(ReleaseCatalog::new(releases))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RELEASES: &str = r#"<results>
  <release id="600000000073715" name="12.2.1.4.0" platform="2000">
    <product id="15991">Oracle WebLogic Server</product>
  </release>
  <release id="600000000122436" name="14.1.1.0.0">
    <product id="15991">Oracle WebLogic Server</product>
  </release>
  <release id="600000000073716" name="12.2.1.4.0">
    <product id="13964">Oracle Coherence</product>
  </release>
  <release name="missing-id"><product id="15991"/></release>
</results>"#;

    #[test]
    fn parses_releases_and_skips_incomplete_entries() {
        let catalog = parse_releases(RELEASES).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.releases()[0].product_ids, vec!["15991".to_string()]);
    }

    #[test]
    fn release_id_matches_product_and_version() {
        let catalog = parse_releases(RELEASES).unwrap();
        assert_eq!(
            catalog.release_id(AruProduct::Wls, "12.2.1.4.0"),
            Some("600000000073715")
        );
        assert_eq!(
            catalog.release_id(AruProduct::Coh, "12.2.1.4.0"),
            Some("600000000073716")
        );
        assert_eq!(catalog.release_id(AruProduct::Soa, "12.2.1.4.0"), None);
        assert_eq!(catalog.release_id(AruProduct::Wls, "15.1.1.0.0"), None);
    }
}
