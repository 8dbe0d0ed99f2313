//! A day at the living-being hospital.
//!
//! Every animal and plant the hospital deals with comes from one process-wide
//! registry. Dogs are wired into a family, labradors and siamese cats are born
//! fresh on every request, and an application hook swaps the ceiba tree for a
//! bonsai without touching its definition.
//!
//! Run with `cargo run --example hospital --features config`.

use maker_registry::{
    BoxError, ConfigurationBag, EntryDefinition, FnHook, HookDiscovery, HookRegistry, LoggingObserver, MakerResult,
    Registry, RegistryBuilder, Resolver, Shutdown,
};
use once_cell::sync::Lazy;
use std::sync::{Arc, Mutex};

// ===== Living beings =====

trait Animal: Send + Sync {
    fn make_noise(&self) -> String;
}

trait Plant: Send + Sync {
    fn grow(&self) -> String;
}

#[derive(Debug, Default)]
struct Dog {
    name: Option<String>,
}

impl Animal for Dog {
    fn make_noise(&self) -> String {
        match &self.name {
            Some(name) => format!("{}: woof woof", name),
            None => "woof woof".to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct Cat;

impl Animal for Cat {
    fn make_noise(&self) -> String {
        "meow".to_string()
    }
}

struct DogFamily {
    parents: (Arc<Dog>, Arc<Dog>),
    members: Mutex<Vec<Arc<Dog>>>,
}

impl DogFamily {
    fn new_member(&self, dog: Arc<Dog>) {
        if let Ok(mut members) = self.members.lock() {
            members.push(dog);
            println!("a new member joins, {} puppies now", members.len());
        }
    }
}

impl Shutdown for DogFamily {
    fn shutdown(&self) -> Result<(), BoxError> {
        let members = self.members.lock().map_err(|e| e.to_string())?;
        println!(
            "{} and {} go home with {} puppies",
            self.parents.0.make_noise(),
            self.parents.1.make_noise(),
            members.len()
        );
        Ok(())
    }
}

struct Daisy {
    kind: String,
}

impl Plant for Daisy {
    fn grow(&self) -> String {
        format!("{} daisy is growing", self.kind)
    }
}

struct Ceiba {
    age: u32,
}

impl Plant for Ceiba {
    fn grow(&self) -> String {
        format!("{} years old ceiba is growing", self.age)
    }
}

// ===== Entries =====

const SPARKY_DOG: &str = "sparky_dog";
const PINKY_DOG: &str = "pinky_dog";
const SPARKY_FAMILY: &str = "sparky_family";
const SIAMESE: &str = "siamese";
const LABRADOR: &str = "labrador";
const DAISY: &str = "daisy";
const CEIBA: &str = "ceiba";

fn living_being_entries() -> RegistryBuilder {
    let mut builder = RegistryBuilder::new();

    // Singletons
    builder.add(
        EntryDefinition::singleton(SPARKY_DOG, |ctx| {
            Ok(Dog { name: Some(ctx.require("sparky.name")?.to_string()) })
        })
        .on_created(|dog: &Dog| println!("{} is ready", dog.make_noise())),
    );
    builder.add_singleton(PINKY_DOG, |ctx| {
        Ok(Dog { name: Some(ctx.require("pinky.name")?.to_string()) })
    });
    builder.add(
        EntryDefinition::singleton(SPARKY_FAMILY, |ctx| {
            Ok(DogFamily {
                parents: (ctx.get::<Dog>(SPARKY_DOG)?, ctx.get::<Dog>(PINKY_DOG)?),
                members: Mutex::new(Vec::new()),
            })
        })
        .shutdown_instance(),
    );

    // Prototypes
    builder.add_prototype(SIAMESE, |_| Ok(Cat));
    builder.add_prototype(LABRADOR, |_| Ok(Dog::default()));
    builder.add_prototype_trait::<dyn Plant, _>(DAISY, |ctx| {
        Ok(Arc::new(Daisy { kind: ctx.require("daisy_kind")?.to_string() }) as Arc<dyn Plant>)
    });
    builder.add_prototype_trait::<dyn Plant, _>(CEIBA, |ctx| {
        Ok(Arc::new(Ceiba { age: ctx.parse("ceiba_age")? }) as Arc<dyn Plant>)
    });

    builder
}

fn load_configuration() -> MakerResult<ConfigurationBag> {
    let resources = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/resources");
    let plants = ConfigurationBag::from_json_file(format!("{}/plant-config.json", resources))?;
    let animals = ConfigurationBag::from_properties_file(format!("{}/animal-config.properties", resources))?;
    // HOSPITAL_SPARKY_NAME=Rex renames sparky
    Ok(plants.merged(&animals).merged(&ConfigurationBag::from_env("HOSPITAL")))
}

/// Application hooks, installed before anything is built.
struct HospitalHooks;

impl HookDiscovery for HospitalHooks {
    fn discover(&self, hooks: &mut HookRegistry) -> MakerResult<()> {
        if std::env::var_os("HOSPITAL_NO_HOOKS").is_none() {
            hooks.register(
                CEIBA,
                Arc::new(FnHook::new(|| Ok(Arc::new(Ceiba { age: 3 }) as Arc<dyn Plant>))),
            );
        }
        Ok(())
    }
}

static LIVING_BEINGS: Lazy<Registry> = Lazy::new(|| {
    let config = load_configuration().unwrap_or_else(|e| panic!("cannot load hospital configuration: {}", e));

    let mut builder = living_being_entries();
    builder.add_observer(Arc::new(LoggingObserver::with_prefix("[hospital]")));
    let registry = builder.build(config);

    registry
        .discover_hooks(&HospitalHooks)
        .unwrap_or_else(|e| panic!("cannot install hospital hooks: {}", e));
    registry
});

// ===== The hospital =====

struct LivingBeingHospital {
    sparky_family: Arc<DogFamily>,
    labrador1: Arc<dyn Animal>,
    labrador2: Arc<dyn Animal>,
    siamese: Arc<dyn Animal>,
    my_daisy: Arc<dyn Plant>,
    my_ceiba: Arc<dyn Plant>,
}

impl LivingBeingHospital {
    fn open() -> MakerResult<Self> {
        let registry = &*LIVING_BEINGS;
        Ok(Self {
            sparky_family: registry.get(SPARKY_FAMILY)?,
            labrador1: registry.get::<Dog>(LABRADOR)?,
            labrador2: registry.get::<Dog>(LABRADOR)?,
            siamese: registry.get::<Cat>(SIAMESE)?,
            my_daisy: registry.get_trait::<dyn Plant>(DAISY)?,
            my_ceiba: registry.get_trait::<dyn Plant>(CEIBA)?,
        })
    }

    fn cure_animal(animal: &dyn Animal) {
        println!("Curing animal... {}", animal.make_noise());
    }

    fn cure_plant(plant: &dyn Plant) {
        println!("Curing plant... {}", plant.grow());
    }

    fn attend_labrador_birth(&self) -> MakerResult<()> {
        println!("Attending dog birth...");
        let newborn = LIVING_BEINGS.get::<Dog>(LABRADOR)?;
        self.sparky_family.new_member(newborn);
        Ok(())
    }

    fn do_hospital_day(&self) -> MakerResult<()> {
        for animal in [&self.siamese, &self.labrador1, &self.labrador2] {
            Self::cure_animal(animal.as_ref());
        }
        for plant in [&self.my_daisy, &self.my_ceiba] {
            Self::cure_plant(plant.as_ref());
        }
        self.attend_labrador_birth()
    }
}

fn main() -> Result<(), BoxError> {
    let hospital = LivingBeingHospital::open()?;
    hospital.do_hospital_day()?;

    println!("\nRegistered living beings:");
    for descriptor in LIVING_BEINGS.descriptors() {
        println!(
            "  {:<14} {:<10} hooked={:<5} cached={}",
            descriptor.name, descriptor.lifetime.to_string(), descriptor.has_hook, descriptor.is_cached
        );
    }

    // Sparky is rebuilt on next use; the family keeps the old Sparky
    LIVING_BEINGS.clear(SPARKY_DOG)?;
    let new_sparky = LIVING_BEINGS.get::<Dog>(SPARKY_DOG)?;
    println!(
        "same sparky in family after clear: {}",
        Arc::ptr_eq(&new_sparky, &hospital.sparky_family.parents.0)
    );

    println!("\nClosing the hospital");
    LIVING_BEINGS.shutdown_all()?;
    LIVING_BEINGS.clear_all();
    Ok(())
}
