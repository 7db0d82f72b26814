// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Aurora Transaction Tool
//!
//! Entry point for the `aurora-tx` binary. Parses CLI arguments, initializes
//! logging, and runs one subcommand against the transaction core:
//!
//! - `keygen`: generate a secret key and print its address
//! - `sign`: sign a text-form transaction
//! - `decode`: decode a binary-form transaction and recover its sender
//! - `select`: order a batch of signed transactions into a block
//!
//! Every command prints one JSON document on stdout.

mod cli;
mod logging;

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::{json, Value};

use aurora_protocol::codec::hexutil;
use aurora_protocol::crypto::SecretKey;
use aurora_protocol::transaction::{decode, decode_text, encode, Signer, Transaction};
use aurora_protocol::txpool::{fill_block, TransactionsByPriceAndNonce};

use cli::{AuroraCli, ChainArgs, Commands};

fn main() -> Result<()> {
    let cli = AuroraCli::parse();
    logging::init_logging(&cli.log_level, cli.log_format);

    let output = match cli.command {
        Commands::Keygen => keygen(),
        Commands::Sign(args) => sign(args)?,
        Commands::Decode(args) => decode_raw(args)?,
        Commands::Select(args) => select(args)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn chain_signer(chain: ChainArgs) -> Signer {
    Signer::new(chain.chain_id)
}

fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn keygen() -> Value {
    let key = SecretKey::generate();
    let address = key.address();
    tracing::info!(address = %address, "generated key");
    json!({
        "secretKey": hexutil::encode_bytes(&key.secret_bytes()),
        "address": address.to_hex(),
        "native": address.to_native(),
    })
}

fn sign(args: cli::SignArgs) -> Result<Value> {
    let key = SecretKey::from_hex(&args.key).context("invalid --key")?;
    let input = read_input(args.input.as_deref())?;
    let unsigned = decode_text(&input).context("failed to decode transaction")?;

    let signer = chain_signer(args.chain);
    let signed = signer.sign(&unsigned, &key).context("signing failed")?;
    tracing::info!(
        hash = %signed.hash(),
        chain_id = ?signer.chain_id(),
        sender = %key.address(),
        "transaction signed"
    );

    Ok(json!({
        "raw": hexutil::encode_bytes(&encode(&signed)),
        "tx": signed,
    }))
}

fn decode_raw(args: cli::DecodeArgs) -> Result<Value> {
    let body = args.raw.trim();
    let body = body.strip_prefix("0x").unwrap_or(body);
    let bytes = hex::decode(body).context("raw transaction is not valid hex")?;
    let tx = decode(&bytes).context("failed to decode transaction")?;

    let signer = chain_signer(args.chain);
    let sender = match signer.sender(&tx) {
        Ok(address) => json!(address),
        Err(e) => {
            tracing::warn!(error = %e, "sender recovery failed");
            Value::Null
        }
    };

    let hash = tx.hash();
    let chain_id = tx.chain_id();
    Ok(json!({
        "tx": tx,
        "hash": hash,
        "sender": sender,
        "chainId": chain_id,
    }))
}

fn select(args: cli::SelectArgs) -> Result<Value> {
    let input = read_input(args.input.as_deref())?;
    let batch: Vec<Transaction> =
        serde_json::from_slice(&input).context("input must be a JSON array of transactions")?;

    let signer = chain_signer(args.chain);
    let (mut queue, rejected) = TransactionsByPriceAndNonce::from_signed(&signer, batch);
    let selection = fill_block(&mut queue, args.gas_limit, |_| Ok::<(), String>(()));

    let included: Vec<Value> = selection
        .included
        .iter()
        .map(|tx| {
            json!({
                "hash": tx.hash(),
                "sender": signer.sender(tx).ok(),
                "nonce": tx.nonce(),
                "gasPrice": hexutil::encode_big(tx.gas_price()),
                "gas": tx.gas(),
            })
        })
        .collect();
    let rejected: Vec<Value> = rejected
        .iter()
        .map(|(tx, e)| json!({ "hash": tx.hash(), "error": e.to_string() }))
        .collect();

    Ok(json!({
        "included": included,
        "skippedAccounts": selection.skipped_accounts,
        "rejected": rejected,
        "gasUsed": selection.gas_used,
    }))
}
