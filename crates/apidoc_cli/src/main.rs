/* 📖 # Why does the CLI take no arguments?

Everything a run needs is in `apidoc.toml`: where the route registry is, which routes to
document, where to write. The binary just looks for that file in the current directory:

1. Change to the project directory
2. Ensure `apidoc.toml` and the route registry exist
3. Run `apidoc`

Exit codes:
- 0: documentation written (individual routes may still have been skipped, see the log)
- 1: configuration, registry or output files could not be read or written
*/

use std::env;
use std::process;

use apidoc_base::tracing::init_tracing;
use apidoc_base::{FilePath, PalHandle, RealPal};
use apidoc_engine::{CONFIG_FILE, generate, load_config};

fn main() {
    if let Err(e) = init_tracing() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    let current_dir = env::current_dir().unwrap_or_else(|e| {
        eprintln!("Error: Failed to get current directory: {}", e);
        process::exit(1);
    });

    let pal = PalHandle::new(RealPal::new(current_dir));

    let config = match load_config(&pal, &FilePath::from(CONFIG_FILE)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config from {}: {}", CONFIG_FILE, e);
            process::exit(1);
        }
    };

    println!("Configuration loaded: {}", config.title);

    let report = match generate(&pal, &config) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if !report.extraction.errors.is_empty() {
        eprintln!("\nRoutes that could not be documented:");
        for error in &report.extraction.errors {
            eprintln!("  - {} ({}): {}", error.route, error.kind, error.error);
        }
    }

    if !report.publish.preserved.is_empty() {
        println!("\nKept manually edited routes:");
        for edit in &report.publish.preserved {
            println!("  * {}", edit.route);
        }
    }

    println!(
        "\nDocumented {} routes ({} skipped) in {}",
        report.publish.routes,
        report.extraction.skipped.len(),
        config.output
    );
    if report.publish.collection_written {
        println!("Postman collection written to {}", config.collection_url());
    }
}
