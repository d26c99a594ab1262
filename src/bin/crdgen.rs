// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! CRD YAML Generator
//!
//! Generates Kubernetes CRD YAML files from the Rust types in src/crd.rs so
//! the manifests in deploy/crds/ are always in sync with the code.
//!
//! Usage:
//!   cargo run --bin crdgen

use instana_agent_operator::crd::{InstanaAgent, RemoteAgent};
use kube::CustomResourceExt;
use std::fs;
use std::path::Path;

const HEADER: &str = "# (c) Copyright IBM Corp. 2025
# SPDX-License-Identifier: Apache-2.0
#
# This file is AUTO-GENERATED from src/crd.rs
# DO NOT EDIT MANUALLY - Run `cargo run --bin crdgen` to regenerate
#
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = Path::new("deploy/crds");
    fs::create_dir_all(output_dir)?;

    println!("Generating CRD YAML files from src/crd.rs...");

    generate_crd::<InstanaAgent>("agents.instana.io.crd.yaml", output_dir)?;
    generate_crd::<RemoteAgent>("remoteagents.instana.io.crd.yaml", output_dir)?;

    println!("Generated CRD YAML files in deploy/crds/");

    Ok(())
}

fn generate_crd<T>(filename: &str, output_dir: &Path) -> Result<(), Box<dyn std::error::Error>>
where
    T: CustomResourceExt,
{
    let crd = T::crd();
    let yaml = serde_yaml::to_string(&crd)?;

    let output_path = output_dir.join(filename);
    fs::write(&output_path, format!("{HEADER}{yaml}"))?;

    println!("  Generated {filename}");

    Ok(())
}
