//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `audience_core` linkage without a host app.
//! - Summarize a catalog JSON file and list its data-integrity issues.

use audience_core::{Catalog, OwnershipIndex, PickerConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("audience_core ping={}", audience_core::ping());
    println!("audience_core version={}", audience_core::core_version());

    let Some(path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    let catalog = match Catalog::from_json_file(&path) {
        Ok(catalog) => catalog,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let [identities, categories, subcategories, subsubs] = catalog.node_counts();
    println!(
        "catalog identities={identities} categories={categories} subcategories={subcategories} subsubs={subsubs}"
    );

    let index = OwnershipIndex::build(&catalog, PickerConfig::default().mode);
    for issue in index.issues() {
        println!("issue: {issue}");
    }
    println!("issues={}", index.issues().len());
    ExitCode::SUCCESS
}
