use crate::di::DnsServices;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::info;
use warden_application::use_cases::ResolveQueryUseCase;
use warden_domain::{CacheRecord, Config, DnsQuery, RecordType, ResolverError};

pub async fn run(config: &Config, domain: &str, record_type: RecordType) -> anyhow::Result<()> {
    let services = DnsServices::new(config)?;
    let query = DnsQuery::fqdn(domain, record_type);

    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    let record = execute_interruptible(&services.resolve_query, &query, ctrl_c).await?;
    info!(
        domain = %record.domain(),
        resolver = %record.resolver(),
        min_ttl = ?record.min_ttl(),
        "Query answered"
    );

    println!(";; {} {} via {}", record.domain(), record.question(), record.resolver());
    println!(";; status: {}", record.rcode());
    for (section, records) in [
        ("ANSWER", record.answer()),
        ("AUTHORITY", record.ns()),
        ("ADDITIONAL", record.extra()),
    ] {
        if records.is_empty() {
            continue;
        }
        println!("\n;; {} SECTION:", section);
        for rr in records {
            println!("{}", rr);
        }
    }
    Ok(())
}

/// Runs the query, cancelling it if `interrupt` completes first. The
/// interrupt watcher never outlives the query.
async fn execute_interruptible<F>(
    use_case: &ResolveQueryUseCase,
    query: &DnsQuery,
    interrupt: F,
) -> Result<CacheRecord, ResolverError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    let watcher = tokio::spawn(async move {
        interrupt.await;
        on_interrupt.cancel();
    });

    let result = use_case.execute(query, &cancel).await;
    watcher.abort();
    result
}
