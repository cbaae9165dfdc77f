//! `urleval extract [path]` – list URLs found in text.

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use urleval_core::extract::extract_urls;

pub fn run_extract(path: Option<&Path>) -> Result<()> {
    let text = match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?
        }
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("read stdin")?;
            buf
        }
    };
    for url in extract_urls(&text) {
        println!("{}", url);
    }
    Ok(())
}
