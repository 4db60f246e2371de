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

use clap::{Parser, Subcommand};
use imagetool::commands::cache::CacheCommand;
use imagetool::commands::inspect::InspectCommand;
use imagetool::commands::resolve::{ResolveArgs, ResolveCommand};
use imagetool::config::new_config;
use imagetool::error::{Result, format_error_chain, format_error_with_color, get_exit_code};
use imagetool::logging;
use std::io::IsTerminal;

#[derive(Parser)]
#[command(name = "imagetool")]
#[command(author, version, about = "WebLogic image installer and patch resolution", long_about = None)]
struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the installer and patch cache
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },

    /// Resolve the installer and patch files for an image build
    #[command(visible_alias = "r")]
    Resolve(ResolveArgs),

    /// Derive the installer type from an Oracle home product list
    InspectProducts {
        /// Comma separated inventory product codes (e.g., "WLS,COH,TOPLINK,JDBC,FIT")
        #[arg(long)]
        products: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    logging::setup_logger(cli.verbose);

    let config = match new_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", format_error_chain(&e));
            std::process::exit(get_exit_code(&e));
        }
    };

    let result: Result<()> = (|| match cli.command {
        Commands::Cache { command } => command.execute(&config),
        Commands::Resolve(args) => {
            let command = ResolveCommand::new(&config)?;
            command.execute(args)
        }
        Commands::InspectProducts { products, json } => {
            let command = InspectCommand::new()?;
            command.execute(&products, json)
        }
    })();

    if let Err(e) = result {
        eprint!("{}", format_error_with_color(&e, std::io::stderr().is_terminal()));
        std::process::exit(get_exit_code(&e));
    }
}
