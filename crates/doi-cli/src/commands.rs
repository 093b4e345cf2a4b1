use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::{info, info_span, warn};

use doi_core::{
    DraftPruner, EngineOptions, PatchOptions, PatchTargets, PayloadOptions, PruneOptions,
    ReconciliationEngine, RelatedItemPatcher, SpreadsheetSync, SyncOptions, merge_candidates,
};
use doi_ingest::{TableFormat, read_identifier_lines, read_table};
use doi_model::Credentials;
use doi_registry::{HttpTransport, ListOptions, RegistryClient, RunContext};

use crate::cli::{ConnectionArgs, PatchRelatedArgs, PruneArgs, PublishArgs};
use crate::types::{PatchSummary, PruneSummary, PublishSummary};

/// Resolves connection flags into an immutable run context.
pub fn run_context(args: &ConnectionArgs) -> Result<RunContext> {
    let credentials: Credentials = args
        .auth
        .parse()
        .context("--auth must be in the form REPO_ID:PASSWORD")?;
    Ok(RunContext::new(args.api_url.clone(), credentials)
        .with_user_agent(args.user_agent.clone())
        .with_timeout(Duration::from_secs(args.timeout)))
}

fn connect(args: &ConnectionArgs) -> Result<RegistryClient<HttpTransport>> {
    let context = run_context(args)?;
    let transport = HttpTransport::new(&context).context("build HTTP client")?;
    info!(
        api_url = %context.api_url,
        repo_id = %context.credentials.repo_id,
        user_agent = %context.user_agent,
        "registry connection configured"
    );
    Ok(RegistryClient::new(context, transport))
}

fn list_options(page_size: usize) -> ListOptions {
    ListOptions::default().with_page_size(page_size)
}

pub fn run_publish(args: &PublishArgs) -> Result<PublishSummary> {
    let span = info_span!("publish", file = %args.file.display());
    let _guard = span.enter();

    TableFormat::from_path(&args.file)
        .with_context(|| format!("cannot publish {}", args.file.display()))?;
    let client = connect(&args.connection)?;

    if args.preflight {
        if args.dry_run {
            info!("dry run: skipping preflight check");
        } else if !client.preflight_check() {
            bail!("preflight check failed; verify --auth and --api-url");
        }
    }

    let options = EngineOptions {
        payload: PayloadOptions {
            prefix: args.prefix.clone(),
            event: args.event,
            publisher_ror: args.publisher_ror.clone(),
            embed_related_item: args.embed_related_item,
        },
        dry_run: args.dry_run,
        append_suffix: args.append_suffix_to_url,
        url_filter_prefix: args.url_filter_prefix.clone(),
    };
    let engine = ReconciliationEngine::new(&client, options);
    let sync = SpreadsheetSync::new(
        &engine,
        SyncOptions {
            no_backup: args.no_backup,
        },
    );
    let report = sync
        .sync_file(&args.file)
        .with_context(|| format!("sync {}", args.file.display()))?;

    Ok(PublishSummary {
        file: args.file.clone(),
        dry_run: args.dry_run,
        report,
    })
}

pub fn run_prune(args: &PruneArgs) -> Result<PruneSummary> {
    let client = connect(&args.connection)?;

    let from_file = match &args.dois_file {
        Some(path) => read_identifier_lines(path)
            .with_context(|| format!("read DOI list {}", path.display()))?,
        None => Vec::new(),
    };
    let pruner = DraftPruner::new(
        &client,
        PruneOptions {
            dry_run: args.dry_run,
            list: list_options(args.page_size),
        },
    );
    let fetched = if args.fetch {
        info!("fetching draft candidates from the registry");
        pruner.fetch_draft_candidates()
    } else {
        Vec::new()
    };

    let candidates = merge_candidates([from_file, fetched]);
    if candidates.is_empty() {
        warn!("no DOIs to delete (provide --dois-file or use --fetch)");
    }
    let report = pruner.prune(&candidates);
    Ok(PruneSummary {
        dry_run: args.dry_run,
        report,
    })
}

pub fn run_patch_related(args: &PatchRelatedArgs) -> Result<PatchSummary> {
    let mut targets = match &args.file {
        Some(path) => {
            let table = read_table(path).with_context(|| format!("read {}", path.display()))?;
            PatchTargets::from_table(&table)
        }
        None => PatchTargets::default(),
    };
    let client = connect(&args.connection)?;

    let cancel = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&cancel);
    if let Err(error) = ctrlc::set_handler(move || handler_flag.store(true, Ordering::SeqCst)) {
        warn!(%error, "could not install interrupt handler");
    }

    let patcher = RelatedItemPatcher::new(
        &client,
        PatchOptions {
            dry_run: args.dry_run,
            list: list_options(args.page_size),
        },
    )
    .with_cancel_flag(cancel);

    if args.fetch_existing {
        targets.extend_with_defaults(patcher.fetch_existing());
    }
    if targets.is_empty() {
        warn!("no DOIs to update (provide a file with DOIs or use --fetch-existing)");
    }

    let report = patcher.run(&targets);
    Ok(PatchSummary {
        dry_run: args.dry_run,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection(auth: &str) -> ConnectionArgs {
        ConnectionArgs {
            auth: auth.to_string(),
            api_url: "https://api.datacite.org/dois".to_string(),
            user_agent: "tester/1.0".to_string(),
            timeout: 30,
        }
    }

    #[test]
    fn run_context_carries_flags() {
        let context = run_context(&connection("ANU.PROD:s3:cret")).unwrap();
        assert_eq!(context.credentials.repo_id, "ANU.PROD");
        assert_eq!(context.credentials.password, "s3:cret");
        assert_eq!(context.user_agent, "tester/1.0");
        assert_eq!(context.timeout, Duration::from_secs(30));
    }

    #[test]
    fn malformed_auth_is_fatal() {
        let error = run_context(&connection("no-colon")).unwrap_err();
        assert!(format!("{error:#}").contains("REPO_ID:PASSWORD"));
    }
}
