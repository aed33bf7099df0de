// Copyright (c) 2022-2023 The MobileCoin Foundation

use std::net::SocketAddr;

use anyhow::Context;
use bip39::{Language, Mnemonic, Seed};
use clap::{Parser, ValueEnum};
use log::{debug, info, trace, warn, LevelFilter};
use strum::Display;
use tokio::{
    io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
    sync::Mutex,
};

use ledger_ton_core::{
    apdu::{
        frame::{MAX_DATA_LEN, MAX_FRAME_LEN},
        status::STATUS_LEN,
    },
    app::{App, Reply},
    engine::{Decision, Review},
    helpers::Slip10Driver,
};

/// TON wallet simulator
///
/// Serves the wallet application over a TCP socket, exchanging
/// `[len:4][frame]` requests for `[len:4][data][status]` responses
/// (with `len` excluding the status word), applying the configured
/// approval policy to presented reviews.
#[derive(Clone, PartialEq, Parser)]
pub struct Args {
    /// BIP-0039 mnemonic for the simulated device seed
    #[clap(long, env = "MNEMONIC", hide_env_values = true)]
    mnemonic: String,

    /// Socket address to listen on
    #[clap(long, default_value = "127.0.0.1:9999")]
    listen: SocketAddr,

    /// Approval policy for presented reviews
    #[clap(long, value_enum, default_value = "auto")]
    approval: Approval,

    /// Log level
    #[clap(long, default_value = "debug")]
    log_level: LevelFilter,
}

/// Approval policy for presented reviews
#[derive(Copy, Clone, Debug, PartialEq, ValueEnum, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Approval {
    /// Approve every review
    Auto,
    /// Reject every review
    Reject,
    /// Prompt for a decision on stdin
    Prompt,
}

type SimApp = App<Slip10Driver>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging
    let _ = simplelog::SimpleLogger::init(args.log_level, simplelog::Config::default());

    // Derive device seed from mnemonic
    let m = Mnemonic::from_phrase(&args.mnemonic, Language::English)
        .map_err(|e| anyhow::anyhow!("invalid mnemonic: {e}"))?;
    let seed = Seed::new(&m, "");

    let drv = Slip10Driver::from_slice(seed.as_bytes()).context("seed setup failed")?;
    let app = Mutex::new(App::new(drv));

    let listener = TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("failed to bind {}", args.listen))?;

    info!("Listening on {} (approval: {})", args.listen, args.approval);

    loop {
        tokio::select!(
            // Serve one connection at a time
            r = listener.accept() => {
                let (s, peer) = r?;
                info!("Connection from {}", peer);

                if let Err(e) = serve(&app, s, args.approval).await {
                    warn!("Connection {} failed: {:?}", peer, e);
                }

                // Discard any request left in progress
                app.lock().await.reset();

                debug!("Connection {} closed", peer);
            }
            // Exit on ctrl + c
            _ = tokio::signal::ctrl_c() => {
                debug!("Exit!");
                break;
            },
        );
    }

    Ok(())
}

/// Exchange frames with a connected client until it disconnects
async fn serve(app: &Mutex<SimApp>, mut s: TcpStream, approval: Approval) -> anyhow::Result<()> {
    let mut rx = [0u8; MAX_FRAME_LEN];
    let mut tx = [0u8; MAX_DATA_LEN + STATUS_LEN];

    loop {
        // Read frame length, exiting on disconnect
        let mut len = [0u8; 4];
        match s.read_exact(&mut len).await {
            Ok(_) => (),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(()),
            Err(e) => return Err(e.into()),
        }

        let n = u32::from_be_bytes(len) as usize;
        if n > rx.len() {
            return Err(anyhow::anyhow!("frame length {n} exceeds maximum"));
        }

        s.read_exact(&mut rx[..n]).await?;

        trace!("rx: {}", hex::encode(&rx[..n]));

        let mut a = app.lock().await;

        let resp_len = match a.handle_apdu(&rx[..n], &mut tx) {
            Reply::Response(n) => n,
            Reply::Deferred => {
                let review = a.review().cloned().context("missing review")?;
                let decision = decide(&review, approval).await?;

                a.decide(review.handle, decision, &mut tx)
            }
        };

        drop(a);

        trace!("tx: {}", hex::encode(&tx[..resp_len]));

        let data_len = resp_len.saturating_sub(STATUS_LEN) as u32;
        s.write_all(&data_len.to_be_bytes()).await?;
        s.write_all(&tx[..resp_len]).await?;
    }
}

/// Display a review and resolve it per the approval policy
async fn decide(review: &Review, approval: Approval) -> anyhow::Result<Decision> {
    match review.subtitle {
        Some(s) => info!("{} {}", review.title, s),
        None => info!("{}", review.title),
    }
    for f in &review.fields {
        info!("  {}: {}", f.name, f.value);
    }

    let d = match approval {
        Approval::Auto => Decision::Approve,
        Approval::Reject => Decision::Reject,
        Approval::Prompt => prompt().await?,
    };

    info!("Decision: {}", d);

    Ok(d)
}

/// Prompt for a decision on stdin, closed input rejects
async fn prompt() -> anyhow::Result<Decision> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        println!("Approve? [y/n]");

        let l = match lines.next_line().await? {
            Some(l) => l,
            None => return Ok(Decision::Reject),
        };

        match l.trim() {
            "y" | "Y" | "yes" => return Ok(Decision::Approve),
            "n" | "N" | "no" => return Ok(Decision::Reject),
            _ => continue,
        }
    }
}
