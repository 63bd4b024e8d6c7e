//! Container construction and dependency resolution.

use std::sync::Arc;

use switchboard::{CoreError, Inventory, Lifetime};

struct Config {
    port: u16,
}

struct Pool {
    config: Arc<Config>,
}

struct Server {
    config: Arc<Config>,
    pool: Arc<Pool>,
}

#[test]
fn singleton_graph_shares_one_instance() {
    let mut inventory = Inventory::new();
    inventory
        .add_service::<Config, _>(Lifetime::Singleton, |_| Ok(Config { port: 8080 }))
        .add_service::<Pool, _>(Lifetime::Singleton, |r| {
            Ok(Pool {
                config: r.get::<Config>()?,
            })
        })
        .add_service::<Server, _>(Lifetime::Singleton, |r| {
            Ok(Server {
                config: r.get::<Config>()?,
                pool: r.get::<Pool>()?,
            })
        });

    let container = inventory.build().unwrap();
    let server = container.get::<Server>().unwrap();
    assert_eq!(server.config.port, 8080);
    assert!(Arc::ptr_eq(&server.config, &server.pool.config));

    let pool = container.get::<Pool>().unwrap();
    assert!(Arc::ptr_eq(&pool, &server.pool));
}

trait Mailer: Send + Sync {
    fn send(&self) -> &'static str;
}

struct SmtpMailer;

impl Mailer for SmtpMailer {
    fn send(&self) -> &'static str {
        "smtp"
    }
}

struct StubMailer;

impl Mailer for StubMailer {
    fn send(&self) -> &'static str {
        "stub"
    }
}

#[test]
fn capability_resolves_by_declared_key() {
    struct Notifier {
        mailer: Arc<dyn Mailer>,
    }

    let mut inventory = Inventory::new();
    inventory
        .add_service::<SmtpMailer, _>(Lifetime::Singleton, |_| Ok(SmtpMailer))
        .provides::<SmtpMailer, dyn Mailer, _>(|m| m)
        .add_service::<Notifier, _>(Lifetime::Singleton, |r| {
            Ok(Notifier {
                mailer: r.get_trait::<dyn Mailer>()?,
            })
        });

    let container = inventory.build().unwrap();
    assert_eq!(container.get::<Notifier>().unwrap().mailer.send(), "smtp");
    assert_eq!(container.get_trait::<dyn Mailer>().unwrap().send(), "smtp");
}

#[test]
fn two_providers_for_one_capability_fail_at_build() {
    let mut inventory = Inventory::new();
    inventory
        .add_service::<SmtpMailer, _>(Lifetime::Singleton, |_| Ok(SmtpMailer))
        .provides::<SmtpMailer, dyn Mailer, _>(|m| m)
        .add_service::<StubMailer, _>(Lifetime::Singleton, |_| Ok(StubMailer))
        .provides::<StubMailer, dyn Mailer, _>(|m| m);

    match inventory.build() {
        Err(CoreError::AmbiguousDependency(name)) => assert!(name.contains("Mailer")),
        other => panic!("expected AmbiguousDependency, got {:?}", other.err()),
    }
}

#[test]
fn missing_dependency_fails_at_startup() {
    let mut inventory = Inventory::new();
    inventory.add_service::<Pool, _>(Lifetime::Singleton, |r| {
        Ok(Pool {
            config: r.get::<Config>()?,
        })
    });

    assert!(matches!(
        inventory.build(),
        Err(CoreError::DependencyUnresolved(_))
    ));
}

#[test]
fn resolution_never_crosses_into_another_category() {
    // Config is request-scoped here, so the singleton Pool must not
    // build it on demand.
    let mut inventory = Inventory::new();
    inventory
        .add_service::<Config, _>(Lifetime::Request, |_| Ok(Config { port: 1 }))
        .add_service::<Pool, _>(Lifetime::Singleton, |r| {
            Ok(Pool {
                config: r.get::<Config>()?,
            })
        });

    assert!(matches!(
        inventory.build(),
        Err(CoreError::DependencyUnresolved(_))
    ));
}

#[test]
fn dependency_cycle_is_reported_with_its_path() {
    struct Chicken {
        _egg: Arc<Egg>,
    }
    struct Egg {
        _chicken: Arc<Chicken>,
    }

    let mut inventory = Inventory::new();
    inventory
        .add_service::<Chicken, _>(Lifetime::Singleton, |r| {
            Ok(Chicken {
                _egg: r.get::<Egg>()?,
            })
        })
        .add_service::<Egg, _>(Lifetime::Singleton, |r| {
            Ok(Egg {
                _chicken: r.get::<Chicken>()?,
            })
        });

    match inventory.build() {
        Err(CoreError::DependencyCycle(path)) => {
            assert!(path.iter().any(|n| n.contains("Chicken")));
            assert!(path.iter().any(|n| n.contains("Egg")));
            assert!(path.len() >= 3);
        }
        other => panic!("expected DependencyCycle, got {:?}", other.err()),
    }
}

#[test]
fn preconstructed_instance_is_resolvable() {
    let mut inventory = Inventory::new();
    inventory.add_instance(Config { port: 443 });
    inventory.add_service::<Pool, _>(Lifetime::Singleton, |r| {
        Ok(Pool {
            config: r.get::<Config>()?,
        })
    });

    let container = inventory.build().unwrap();
    assert_eq!(container.get::<Pool>().unwrap().config.port, 443);
}
