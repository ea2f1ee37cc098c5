//! Integration tests for release reconciliation against an in-memory store

use crate::helpers::{Call, MemoryStore, ScriptedOracle, release};
use anyhow::Result;
use shipnotes::core::error::{ShipError, StoreError};
use shipnotes::release::{Component, Reconciler, ReleasePatch, ReleaseSpec};
use shipnotes::store::find_release_by_name;

fn widgets() -> Component {
  Component::new("acme", "widgets")
}

/// Look up the current release by name, then reconcile it
fn reconcile_once(store: &MemoryStore, oracle: &ScriptedOracle, desired: &ReleaseSpec) -> Result<shipnotes::release::Release> {
  let actual = find_release_by_name(store, &widgets(), &desired.name)?;
  Ok(Reconciler::new(store, oracle).reconcile(&widgets(), desired, actual)?)
}

#[test]
fn test_absent_release_is_created_then_left_alone() -> Result<()> {
  let store = MemoryStore::new();
  let oracle = ScriptedOracle::new(&[]);
  let desired = ReleaseSpec::new("v1.2.0", "1.2.0", "B", true);

  let created = reconcile_once(&store, &oracle, &desired)?;
  assert!(!created.draft);
  assert!(!created.prerelease);
  assert_eq!(created.tag_name, "v1.2.0");
  assert_eq!(store.mutations().len(), 1);
  assert!(matches!(&store.mutations()[0], Call::Create(_, spec) if !spec.prerelease && spec.publish));

  store.clear_calls();
  let again = reconcile_once(&store, &oracle, &desired)?;
  assert_eq!(again, created);
  assert!(store.mutations().is_empty(), "second run must not mutate");
  assert!(oracle.prompts().is_empty());

  Ok(())
}

#[test]
fn test_stale_prerelease_flag_settles_after_create() -> Result<()> {
  let store = MemoryStore::new();
  let oracle = ScriptedOracle::new(&[]);
  // Flag disagrees with the tag; the tag decides what gets written
  let desired = ReleaseSpec {
    prerelease: true,
    ..ReleaseSpec::new("v1.2.0", "1.2.0", "B", true)
  };

  let created = reconcile_once(&store, &oracle, &desired)?;
  assert!(!created.prerelease);
  assert_eq!(store.mutations().len(), 1);

  for _ in 0..2 {
    store.clear_calls();
    reconcile_once(&store, &oracle, &desired)?;
    assert!(store.mutations().is_empty(), "reconcile must settle: {:?}", store.mutations());
  }

  Ok(())
}

#[test]
fn test_draft_created_when_not_publishing() -> Result<()> {
  let store = MemoryStore::new();
  let oracle = ScriptedOracle::new(&[]);

  let created = reconcile_once(&store, &oracle, &ReleaseSpec::new("0.9.0", "0.9.0", "", false))?;
  assert!(created.draft);
  assert!(created.prerelease);

  Ok(())
}

#[test]
fn test_content_change_is_one_update() -> Result<()> {
  let store = MemoryStore::new().with_release(&widgets(), release(7, "1.0.0", "1.0.0-rc1", "old", true));
  let oracle = ScriptedOracle::new(&[]);

  let updated = reconcile_once(&store, &oracle, &ReleaseSpec::new("1.0.0", "1.0.0", "new", false))?;
  assert_eq!(updated.tag_name, "1.0.0");
  assert_eq!(updated.body, "new");
  assert!(!updated.prerelease);
  assert!(updated.draft);

  assert_eq!(
    store.mutations(),
    vec![Call::Update(
      widgets(),
      7,
      ReleasePatch {
        tag_name: Some("1.0.0".to_string()),
        body: Some("new".to_string()),
        prerelease: Some(false),
        draft: None,
      }
    )]
  );

  Ok(())
}

#[test]
fn test_draft_is_published_after_content_update() -> Result<()> {
  let store = MemoryStore::new().with_release(&widgets(), release(7, "1.0.0", "1.0.0", "old", true));
  let oracle = ScriptedOracle::new(&[]);

  let result = reconcile_once(&store, &oracle, &ReleaseSpec::new("1.0.0", "1.0.0", "new", true))?;
  assert!(!result.draft);
  assert_eq!(result.body, "new");

  let mutations = store.mutations();
  assert_eq!(mutations.len(), 2);
  assert_eq!(mutations[1], Call::Update(widgets(), 7, ReleasePatch::draft(false)));

  Ok(())
}

#[test]
fn test_unpublish_declined_keeps_release_public() -> Result<()> {
  let store = MemoryStore::new().with_release(&widgets(), release(7, "1.0.0", "1.0.0", "B", false));
  let oracle = ScriptedOracle::new(&[false]);

  let result = reconcile_once(&store, &oracle, &ReleaseSpec::new("1.0.0", "1.0.0", "B", false))?;
  assert!(!result.draft);
  assert!(store.mutations().is_empty());
  assert_eq!(oracle.prompts().len(), 1);
  assert!(oracle.prompts()[0].contains("acme/widgets"));

  Ok(())
}

#[test]
fn test_unpublish_approved_makes_draft() -> Result<()> {
  let store = MemoryStore::new().with_release(&widgets(), release(7, "1.0.0", "1.0.0", "B", false));
  let oracle = ScriptedOracle::new(&[true]);

  let result = reconcile_once(&store, &oracle, &ReleaseSpec::new("1.0.0", "1.0.0", "B", false))?;
  assert!(result.draft);
  assert_eq!(store.mutations(), vec![Call::Update(widgets(), 7, ReleasePatch::draft(true))]);
  assert!(store.releases_of(&widgets())[0].draft);

  Ok(())
}

#[test]
fn test_release_found_by_name_not_tag() -> Result<()> {
  let store = MemoryStore::new()
    .with_release(&widgets(), release(1, "other", "1.0.0", "B", false))
    .with_release(&widgets(), release(2, "1.0.0", "1.0.0-rc2", "B", false));
  let oracle = ScriptedOracle::new(&[]);

  reconcile_once(&store, &oracle, &ReleaseSpec::new("1.0.0", "1.0.0", "B", true))?;
  assert!(matches!(store.mutations().as_slice(), [Call::Update(_, 2, _)]));

  Ok(())
}

#[test]
fn test_store_failure_propagates() {
  let store = MemoryStore::new().with_release(&widgets(), release(7, "1.0.0", "1.0.0", "old", true));
  store.fail_mutations();
  let oracle = ScriptedOracle::new(&[]);

  let desired = ReleaseSpec::new("1.0.0", "1.0.0", "new", true);
  let actual = find_release_by_name(&store, &widgets(), "1.0.0").unwrap();
  let err = Reconciler::new(&store, &oracle)
    .reconcile(&widgets(), &desired, actual)
    .unwrap_err();

  assert!(matches!(err, ShipError::Store(StoreError::Api { status: 500, .. })));
  // Aborted after the failed content update; publish never attempted
  assert_eq!(store.mutations().len(), 1);
}
