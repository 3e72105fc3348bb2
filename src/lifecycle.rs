//! Bootstrap and run: discover the catalog, register it with the engine,
//! execute SQL.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Context;
use datafusion::arrow::util::pretty::pretty_format_batches;
use datafusion::catalog::SchemaProvider;
use datafusion::prelude::SessionContext;
use log::info;

use gridsql_client::{RecordStore, RestClient};
use gridsql_core::Provider;

use crate::config::ServerConfig;

pub struct App {
    pub ctx: SessionContext,
    pub provider: Arc<Provider>,
}

/// Discover the upstream catalog and register it with a fresh engine
/// session.
///
/// DataFusion's catalog lookups are synchronous, so every base is
/// materialized (schemas only) here, before registration.
pub async fn bootstrap(config: &ServerConfig) -> anyhow::Result<App> {
    let store: Arc<dyn RecordStore> = Arc::new(RestClient::new(
        &config.upstream.api_url,
        &config.upstream.api_token,
    ));

    let provider = Arc::new(
        Provider::connect(store, config.page_cache())
            .await
            .context("failed to connect to the upstream record store")?,
    );
    let databases = provider
        .all_databases()
        .await
        .context("failed to build the catalog")?;
    info!("catalog ready: {} databases", databases.len());
    for db in &databases {
        info!("  {} ({} tables)", db.name(), db.table_names().len());
    }

    let ctx = SessionContext::new();
    ctx.register_catalog("grid", provider.clone());
    Ok(App { ctx, provider })
}

/// Execute the given statements, or read them line by line from stdin when
/// none were passed.
pub async fn run(app: &App, statements: &[String]) -> anyhow::Result<()> {
    if statements.is_empty() {
        repl(app).await
    } else {
        for sql in statements {
            execute(&app.ctx, sql).await?;
        }
        Ok(())
    }
}

async fn repl(app: &App) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        write!(stdout, "gridsql> ")?;
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(()); // EOF
        }
        let sql = line.trim();
        if sql.is_empty() {
            continue;
        }
        if sql.eq_ignore_ascii_case("exit") || sql.eq_ignore_ascii_case("quit") {
            return Ok(());
        }
        // Keep the session alive across statement errors.
        if let Err(err) = execute(&app.ctx, sql).await {
            eprintln!("error: {err:#}");
        }
    }
}

async fn execute(ctx: &SessionContext, sql: &str) -> anyhow::Result<()> {
    let frame = ctx.sql(sql).await?;
    let batches = frame.collect().await?;
    let rows: usize = batches.iter().map(|b| b.num_rows()).sum();
    println!("{}", pretty_format_batches(&batches)?);
    println!("({rows} rows)");
    Ok(())
}
