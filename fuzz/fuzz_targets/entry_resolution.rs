#![no_main]

use libfuzzer_sys::fuzz_target;
use maker_registry::{ConfigurationBag, FnHook, MakerError, RegistryBuilder, Resolver};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// Each byte is one operation on one of four entries; the registry must keep
// singleton identity and construction counts consistent under any sequence.
fuzz_target!(|data: &[u8]| {
    let builds = Arc::new(AtomicUsize::new(0));

    let mut builder = RegistryBuilder::new();
    for name in ["sparky", "pinky"] {
        let counter = builds.clone();
        builder.add_singleton(name, move |ctx| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(ctx.require(&format!("{}.name", name))?.to_string())
        });
    }
    builder.add_prototype("labrador", |_| Ok("Lab".to_string()));
    builder.add_singleton("failing", |ctx| Err::<String, _>(ctx.fail("always fails")));
    let registry = builder.build(
        ConfigurationBag::new()
            .with("sparky.name", "Sparky")
            .with("pinky.name", "Pinky"),
    );

    let names = ["sparky", "pinky", "labrador", "failing"];
    let mut held: [Option<Arc<String>>; 4] = Default::default();

    for byte in data {
        let slot = (byte & 0x03) as usize;
        let name = names[slot];

        match byte >> 2 & 0x07 {
            0 | 1 | 2 => match registry.get::<String>(name) {
                Ok(value) => {
                    if registry.lifetime(name).unwrap().is_singleton() {
                        if let Some(previous) = &held[slot] {
                            assert!(Arc::ptr_eq(previous, &value));
                        }
                        held[slot] = Some(value);
                    }
                }
                Err(MakerError::ConstructionFailure { .. }) => {
                    assert_eq!(name, "failing");
                    assert!(!registry.is_cached(name).unwrap());
                }
                Err(other) => panic!("unexpected error for {}: {}", name, other),
            },
            3 => {
                registry.clear(name).unwrap();
                held[slot] = None;
            }
            4 => {
                registry.clear_all();
                held = Default::default();
            }
            5 => {
                let _ = registry.shutdown_all();
            }
            6 => {
                let value = format!("hooked {}", name);
                registry
                    .install_hook(name, Arc::new(FnHook::new(move || Ok(value.clone()))))
                    .unwrap();
            }
            _ => {
                assert!(registry.get::<u64>(name).is_err());
            }
        }
    }

    let cached = names
        .iter()
        .filter(|name| registry.is_cached(name).unwrap())
        .count();
    assert!(cached <= 3);
    assert!(builds.load(Ordering::SeqCst) <= data.len());
});
