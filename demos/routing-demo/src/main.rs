//! routing-demo
//!
//! Registers a small record catalogue and drives it with navigation events.

use anyhow::Result;
use std::collections::BTreeMap;
use waymark::prelude::*;

const SETTINGS: &str = include_str!("../waymark.toml");

struct Home;

impl Page<String> for Home {
    fn elements(&self, _: &Place, _: &Parameter, _: &LoadedData) -> Vec<String> {
        vec!["Welcome".to_string(), "Browse records by decade.".to_string()]
    }
}

struct Decade;

impl Page<String> for Decade {
    fn elements(&self, _: &Place, parameter: &Parameter, data: &LoadedData) -> Vec<String> {
        let mut nodes = vec![format!(
            "Records {} - {}",
            parameter.get_or("from", "?"),
            parameter.get_or("to", "?")
        )];
        if let Some(titles) = data.get::<Vec<String>>() {
            nodes.extend(titles.iter().cloned());
        }
        nodes
    }
}

struct Record;

impl Page<String> for Record {
    fn elements(&self, _: &Place, parameter: &Parameter, data: &LoadedData) -> Vec<String> {
        vec![
            format!("Record #{}", parameter.get_or("id", "?")),
            data.get::<String>().cloned().unwrap_or_default(),
        ]
    }
}

fn catalogue() -> BTreeMap<u32, (u32, &'static str)> {
    BTreeMap::from([
        (1, (1965, "Rubber Soul")),
        (2, (1967, "Sgt. Pepper's Lonely Hearts Club Band")),
        (3, (1971, "Blue")),
        (4, (1977, "Rumours")),
    ])
}

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::from_toml_str(SETTINGS)?;
    waymark::core::logging::try_init(&settings.logging)?;

    let records = loader_fn(|_, parameter: Parameter| async move {
        let from: u32 = parameter.get_or("from", "0").parse()?;
        let to: u32 = parameter.get_or("to", "0").parse()?;
        let titles = catalogue()
            .into_values()
            .filter(|(year, _)| (from..to).contains(year))
            .map(|(year, title)| format!("{year}: {title}"))
            .collect::<Vec<_>>();
        Ok(LoadedData::new(titles))
    });
    let record = loader_fn(|_, parameter: Parameter| async move {
        let id: u32 = parameter.get_or("id", "0").parse()?;
        match catalogue().get(&id) {
            Some((year, title)) => Ok(LoadedData::new(format!("{title} ({year})"))),
            None => anyhow::bail!("no record with id {id}"),
        }
    });

    let host = MemoryHost::new("/records-app").with_root("#main");
    let mut manager = PlaceManager::new(host.clone())
        .configure(&settings.router)
        .register_loader("record", record)
        .after_place(|place: &Place, parameter: &Parameter| {
            tracing::info!(route = place.route(), params = parameter.len(), "Arrived");
        })
        .register_places(
            Places::new()
                .add(Place::new("/").title("Home"), || Home)
                .children(
                    "/records",
                    Places::new()
                        .add(Place::new(":from/:to").title("Decade").loader(records), || Decade),
                )
                .add(Place::new("/record/:id").title("Record").named_loader("record"), || Record),
        );

    manager.start().await;
    show(&host);

    let (tx, rx) = tokio::sync::mpsc::channel(16);
    for url in [
        manager.href("/records/1960/1970"),
        manager.href("/record/3"),
        manager.href("/record/42"),
        manager.href("/nowhere"),
    ] {
        tx.send(NavigationEvent::Link(url)).await?;
    }
    tx.send(NavigationEvent::PopState(Some("/records-app/records/1970/1980".into())))
        .await?;
    drop(tx);

    let events = tokio::spawn(async move {
        manager.run(rx).await;
        manager
    });
    let manager = events.await?;

    show(&host);
    println!("current place: {:?}", manager.current().map(Place::route));
    println!("history: {:?}", host.history());
    Ok(())
}

fn show(host: &MemoryHost) {
    println!("[{}]", host.title().unwrap_or_default());
    for node in host.mounted("#main") {
        println!("  {node}");
    }
}
