//! Build script for the moodlist CLI.
//!
//! Copies the `.env.example` configuration template from the crate root into
//! the user's local data directory (`<data_local_dir>/moodlist/`), which is
//! where `config::load_env` looks for the real `.env` file. Users can copy
//! the template next to it and fill in their Spotify and Hugging Face
//! credentials.
//!
//! Failing to write the template never fails the build: the template is a
//! convenience, and read-only home directories (CI, sandboxes) are common.

use std::{env, fs, path::PathBuf};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=.env.example");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let env_example_path = manifest_dir.join(".env.example");

    if !env_example_path.is_file() {
        println!(
            "cargo:warning=.env.example not found at {}",
            env_example_path.display()
        );
        return Ok(());
    }

    let mut out_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    out_dir.push("moodlist");

    let copied = fs::create_dir_all(&out_dir).and_then(|_| {
        let contents = fs::read_to_string(&env_example_path)?;
        fs::write(out_dir.join(".env.example"), contents)
    });

    if let Err(e) = copied {
        println!(
            "cargo:warning=could not copy .env.example to {}: {}",
            out_dir.display(),
            e
        );
    }

    Ok(())
}
