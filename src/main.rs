// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use quarry::binary::BlockStoreReader;
use quarry::build::run_build;
use quarry::config::Parameters;
use quarry::retrieval::{Node, Retrieval};
use quarry::utils::tokenize;

mod cli;
use cli::display::{
    format_size, key_label, pad_left, pad_right, rank_label, row, score_value, section_bot,
    section_mid, section_top,
};
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quarry=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let parameters = match &cli.parameters {
        Some(path) => Parameters::from_json_file(path)
            .with_context(|| format!("reading parameters from {}", path.display()))?,
        None => Parameters::default(),
    };

    match cli.command {
        Commands::Build { input, output } => {
            let summary = run_build(&input, &output, &parameters)
                .with_context(|| format!("building {} from {}", output.display(), input.display()))?;
            eprintln!(
                "built {}: {} documents, {} terms, {} positions",
                output.display(),
                summary.documents,
                summary.terms,
                summary.collection_length
            );
        }
        Commands::Inspect { file, keys } => inspect(&file, keys)?,
        Commands::Search {
            index,
            query,
            limit,
            json,
        } => {
            let node = parse_query(&query, "combine")?;
            let requested = limit.unwrap_or(parameters.requested);
            let retrieval = Retrieval::open(&index, parameters)
                .with_context(|| format!("opening index {}", index.display()))?;
            let results = retrieval.run_query(&node, requested)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                section_top(&format!("{}", node));
                for result in &results {
                    row(&format!(
                        " {} {} {}",
                        rank_label(result.rank),
                        score_value(result.score),
                        pad_right(&result.name, 40)
                    ));
                }
                section_bot();
            }
        }
        Commands::Xcount { index, query } => {
            let node = parse_query(&query, "od")?;
            let retrieval = Retrieval::open(&index, parameters)
                .with_context(|| format!("opening index {}", index.display()))?;
            let stats = retrieval.node_statistics(&node)?;
            println!(
                "{}\tcount={}\tdocuments={}\tmax={}",
                node, stats.node_frequency, stats.node_document_count, stats.maximum_count
            );
        }
    }
    Ok(())
}

/// A JSON operator tree, or plain words joined under `operator`. A single
/// word becomes a bare term node.
fn parse_query(query: &str, operator: &str) -> Result<Node> {
    let trimmed = query.trim();
    if trimmed.starts_with('{') {
        return Ok(Node::from_json_str(trimmed).context("parsing operator tree")?);
    }
    let mut terms: Vec<Node> = tokenize(trimmed).iter().map(|t| Node::extents(t)).collect();
    match terms.len() {
        0 => bail!("empty query"),
        1 => Ok(terms.remove(0)),
        _ => Ok(Node::new(operator, terms)),
    }
}

fn inspect(path: &Path, keys: usize) -> Result<()> {
    let reader =
        BlockStoreReader::open(path).with_context(|| format!("opening {}", path.display()))?;
    let footer = reader.footer();
    let file_len = std::fs::metadata(path)?.len();

    section_top(&format!("{}", path.display()));
    row(&format!(" size           {}", format_size(file_len)));
    row(&format!(" blocks         {}", reader.block_count()));
    row(&format!(" block size     {}", format_size(footer.block_size as u64)));
    row(&format!(" vocab group    {}", footer.vocab_group));
    row(&format!(" compressed     {}", footer.compressed));
    row(&format!(" vocabulary at  {}", footer.vocabulary_offset));
    row(&format!(" manifest at    {}", footer.manifest_offset));

    section_mid("MANIFEST");
    let manifest = reader.manifest();
    for key in manifest.keys() {
        if let Some(value) = manifest.get(key) {
            row(&format!(" {} {}", pad_right(key, 22), value));
        }
    }

    section_mid("KEYS");
    if let Some(mut cursor) = reader.iterator()? {
        let mut shown = 0;
        while !cursor.is_done() && shown < keys {
            row(&format!(
                " {} {}",
                pad_left(&format!("#{}", cursor.block_index()), 6),
                key_label(cursor.key())
            ));
            shown += 1;
            if !cursor.next()? {
                break;
            }
        }
    }
    section_bot();
    Ok(())
}
