//! Scenario: deadlines and cancellation from the call context reach the
//! task await step and surface as the failing operation's error.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use vmf_folder::{CallContext, FieldStatus, FolderError, FolderIdentity, FolderReconciler, FolderSpec};
use vmf_inventory::InventoryError;
use vmf_inventory_memory::MemoryInventory;

async fn created() -> (FolderReconciler<MemoryInventory>, FolderIdentity, FolderSpec) {
    let inv = MemoryInventory::new();
    inv.add_datacenter("DC1");
    inv.ensure_folder("DC1/vm/eng").unwrap();
    let r = FolderReconciler::new(inv);
    let spec = FolderSpec::new("DC1", "/eng", "build");
    let id = r.create(&CallContext::background(), &spec).await.unwrap();
    (r, id, spec)
}

#[tokio::test]
async fn hung_rename_task_hits_deadline() {
    let (r, id, old) = created().await;
    r.client().set_hang_tasks(true);
    let ctx = CallContext::with_timeout(Duration::from_millis(50));

    let failure = r
        .update(&ctx, &id, &old, &FolderSpec::new("DC1", "/eng", "deploy"))
        .await
        .unwrap_err();

    assert!(matches!(
        failure.error,
        FolderError::RenameFailed(InventoryError::DeadlineExceeded)
    ));
    assert_eq!(failure.report.name, FieldStatus::Failed);
    assert!(!failure.error.is_retryable());
    assert_eq!(
        r.client().path_of(&id.to_reference()).as_deref(),
        Some("/DC1/vm/eng/build")
    );
}

#[tokio::test]
async fn cancellation_interrupts_destroy_wait() {
    let (r, id, _) = created().await;
    r.client().set_hang_tasks(true);
    let token = CancellationToken::new();
    let ctx = CallContext::background().with_cancellation(token.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();
    });
    let err = r.delete(&ctx, &id).await.unwrap_err();
    canceller.await.unwrap();

    assert!(matches!(err, FolderError::DeleteFailed(InventoryError::Cancelled)));
}

#[tokio::test]
async fn already_cancelled_context_makes_no_calls() {
    let (r, id, _) = created().await;
    r.client().clear_journal();
    let token = CancellationToken::new();
    token.cancel();
    let ctx = CallContext::background().with_cancellation(token);

    let err = r.read(&ctx, &id, "DC1").await.unwrap_err();

    assert!(matches!(err, FolderError::ReadFailed(InventoryError::Cancelled)));
    assert!(r.client().journal().is_empty());
}
