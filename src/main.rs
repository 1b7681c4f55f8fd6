/*!
 * Guest Kernel - Host Probe
 *
 * Checks that this host can carry a guest: probes page size and
 * allocation granularity, reserves one full guest address space (plus the
 * code lookup table in large-address mode), builds the syscall table, and
 * prints what it found as JSON before releasing everything.
 */

use guest_kernel::{
    init_tracing, GuestAddressSpace, KernelServices, NoTranslationCache, SubstrateConfig,
    SyscallTrapHandler,
};
use miette::{IntoDiagnostic, Result};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

fn main() -> Result<()> {
    init_tracing();

    let config = match std::env::args().nth(1) {
        Some(path) => SubstrateConfig::from_json_file(path)?,
        None => SubstrateConfig::from_env()?,
    };
    config.validate()?;
    info!(scheduling = ?config.scheduling, large = config.large_address_space, "Probing host");

    let space = GuestAddressSpace::native(&config, Arc::new(NoTranslationCache))?;
    let handler = SyscallTrapHandler::with_default_table(&config, KernelServices::unsupported())?;

    let report = json!({
        "page_size": space.allocator().page_size(),
        "allocation_granularity": space.allocator().granularity(),
        "grain_pages": space.allocator().grain_pages(),
        "guest_base": format!("{:#x}", space.host_base()),
        "code_lookup_table": space.code_lookup().is_some(),
        "registered_syscalls": handler.table().len(),
        "address_space": space.stats(),
        "traps": handler.stats(),
    });
    println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);

    space.release()?;
    info!("Guest address space released");
    Ok(())
}
