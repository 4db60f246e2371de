use crate::error::Result;
use crate::installer::FmwInstallerType;
use colored::*;
use serde::Serialize;

#[derive(Serialize)]
struct InspectOutput {
    installer_type: String,
    products: Vec<String>,
    installers: Vec<String>,
}

/// Reports which installer bundle an Oracle home inventory corresponds to.
pub struct InspectCommand;

impl InspectCommand {
    pub fn new() -> Result<Self> {
        Ok(Self)
    }

    pub fn execute(&self, products: &str, json: bool) -> Result<()> {
        let bundle = FmwInstallerType::derive_type(products);

        if json {
            let output = InspectOutput {
                installer_type: bundle.name().to_string(),
                products: bundle
                    .products()
                    .iter()
                    .map(|product| product.code().to_string())
                    .collect(),
                installers: bundle
                    .installers()
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        println!("{}", bundle.name().cyan().bold());
        let installers: Vec<String> = bundle.installers().iter().map(ToString::to_string).collect();
        println!("  Installers: {}", installers.join(", "));
        Ok(())
    }
}
