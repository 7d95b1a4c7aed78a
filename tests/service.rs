use std::collections::BTreeSet;
use std::io;

use crossbeam_utils::thread;
use rlist::{Catalog, CatalogStore, JsonFileStore, ListService, MemoryStore, Result, RlistError};
use tempfile::TempDir;

fn file_service(temp_dir: &TempDir) -> ListService<JsonFileStore> {
    ListService::new(JsonFileStore::open(temp_dir.path().join("data.json")))
}

#[test]
fn append_then_get_and_size() {
    let service = ListService::new(MemoryStore::new());
    for v in [3, 1, 4, 1, 5, 9].iter() {
        assert!(service.append("pi", *v).unwrap());
    }

    assert_eq!(service.size("pi").unwrap(), 6);
    assert_eq!(service.get("pi").unwrap(), 9);
}

#[test]
fn remove_returns_what_get_would_have() {
    let service = ListService::new(MemoryStore::new());
    service.append("a", 10).unwrap();
    service.append("a", 20).unwrap();

    let peeked = service.get("a").unwrap();
    let size_before = service.size("a").unwrap();
    assert_eq!(service.remove("a").unwrap(), peeked);
    assert_eq!(service.size("a").unwrap(), size_before - 1);
}

#[test]
fn unknown_list_is_not_found() {
    let service = ListService::new(MemoryStore::new());
    service.append("other", 1).unwrap();

    assert!(matches!(service.get("ghost"), Err(RlistError::NotFound(_))));
    assert!(matches!(service.remove("ghost"), Err(RlistError::NotFound(_))));
    assert!(matches!(service.size("ghost"), Err(RlistError::NotFound(_))));
}

#[test]
fn example_trace() -> Result<()> {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let service = file_service(&temp_dir);

    assert!(service.append("numbers", 5)?);
    assert!(service.append("numbers", 7)?);
    assert_eq!(service.get("numbers")?, 7);
    assert_eq!(service.size("numbers")?, 2);
    assert_eq!(service.remove("numbers")?, 7);
    assert_eq!(service.size("numbers")?, 1);
    assert_eq!(service.remove("numbers")?, 5);
    assert!(matches!(service.get("numbers"), Err(RlistError::EmptyList(_))));
    assert!(matches!(service.remove("numbers"), Err(RlistError::EmptyList(_))));
    assert_eq!(service.size("numbers")?, 0);
    Ok(())
}

#[test]
fn list_names_includes_drained_lists_only_once_created() -> Result<()> {
    let service = ListService::new(MemoryStore::new());
    assert!(service.list_names()?.is_empty());

    service.append("kept", 1)?;
    service.append("drained", 2)?;
    service.remove("drained")?;
    let _ = service.get("never");

    let expected: BTreeSet<String> = ["drained", "kept"].iter().map(|s| s.to_string()).collect();
    assert_eq!(service.list_names()?, expected);
    Ok(())
}

#[test]
fn state_survives_restart() -> Result<()> {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    {
        let service = file_service(&temp_dir);
        service.append("a", 1)?;
        service.append("a", 2)?;
    }

    let service = file_service(&temp_dir);
    assert_eq!(service.get("a")?, 2);
    assert_eq!(service.size("a")?, 2);
    Ok(())
}

#[test]
fn every_operation_reads_the_file() -> Result<()> {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let service = file_service(&temp_dir);
    service.append("a", 1)?;

    // another writer changes the file between calls
    let mut outside = JsonFileStore::open(temp_dir.path().join("data.json"));
    let mut catalog = outside.load()?;
    catalog.append("a", 42);
    outside.save(&catalog)?;

    assert_eq!(service.get("a")?, 42);
    Ok(())
}

#[test]
fn concurrent_appends_lose_nothing() {
    const N: i64 = 64;
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let service = file_service(&temp_dir);

    thread::scope(|s| {
        for i in 0..N {
            let service = service.clone();
            s.spawn(move |_| {
                assert!(service.append("shared", i).unwrap());
            });
        }
    })
    .unwrap();

    assert_eq!(service.size("shared").unwrap(), N as usize);

    let mut seen = Vec::new();
    while let Ok(v) = service.remove("shared") {
        seen.push(v);
    }
    seen.sort_unstable();
    assert_eq!(seen, (0..N).collect::<Vec<_>>());
}

#[test]
fn concurrent_mixed_operations_on_many_lists() {
    let service = ListService::new(MemoryStore::new());

    thread::scope(|s| {
        for t in 0..8 {
            let service = service.clone();
            s.spawn(move |_| {
                let name = format!("list-{}", t % 2);
                for i in 0..50 {
                    service.append(&name, i).unwrap();
                    service.size(&name).unwrap();
                    service.list_names().unwrap();
                }
            });
        }
    })
    .unwrap();

    assert_eq!(service.size("list-0").unwrap(), 200);
    assert_eq!(service.size("list-1").unwrap(), 200);
}

#[test]
fn corrupt_file_is_reported_to_caller() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    std::fs::write(temp_dir.path().join("data.json"), "{{{").unwrap();
    let service = file_service(&temp_dir);

    assert!(matches!(service.append("a", 1), Err(RlistError::Corrupt { .. })));
    assert!(matches!(service.list_names(), Err(RlistError::Corrupt { .. })));
}

/// a store whose saves always fail
struct ReadOnlyStore(Catalog);

impl CatalogStore for ReadOnlyStore {
    fn load(&mut self) -> Result<Catalog> {
        Ok(self.0.clone())
    }

    fn save(&mut self, _catalog: &Catalog) -> Result<()> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read only").into())
    }
}

#[test]
fn failed_save_is_reported_and_changes_nothing() {
    let mut catalog = Catalog::new();
    catalog.append("a", 1);
    let service = ListService::new(ReadOnlyStore(catalog));

    assert!(matches!(service.append("a", 2), Err(RlistError::Io(_))));
    assert!(matches!(service.remove("a"), Err(RlistError::Io(_))));
    assert_eq!(service.get("a").unwrap(), 1);
    assert_eq!(service.size("a").unwrap(), 1);
}

#[test]
fn panic_while_holding_lock_does_not_wedge_service() {
    /// a store that panics on its first load
    struct Flaky {
        panicked: bool,
        inner: MemoryStore,
    }

    impl CatalogStore for Flaky {
        fn load(&mut self) -> Result<Catalog> {
            if !self.panicked {
                self.panicked = true;
                panic!("disk on fire");
            }
            self.inner.load()
        }

        fn save(&mut self, catalog: &Catalog) -> Result<()> {
            self.inner.save(catalog)
        }
    }

    let service = ListService::new(Flaky {
        panicked: false,
        inner: MemoryStore::new(),
    });

    let svc = service.clone();
    let joined = std::thread::spawn(move || {
        panic_control::disable_hook_in_current_thread();
        svc.append("a", 1)
    })
    .join();
    assert!(joined.is_err());

    assert!(service.append("a", 2).unwrap());
    assert_eq!(service.get("a").unwrap(), 2);
}
