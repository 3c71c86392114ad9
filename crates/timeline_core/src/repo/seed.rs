//! Fixed sample data for first-run seeding.
//!
//! Records are inserted first and their generated ids are captured, so the
//! sample edges stay correct even when autoincrement counters are not at 1.

use crate::model::datetime::{format_date_time, parse_date_time};
use crate::repo::error::{StoreError, StoreResult};
use crate::repo::relation_linker::{link, RelationKind};
use rusqlite::{params, Connection};
use std::collections::HashMap;

struct SampleEvent {
    key: &'static str,
    title: &'static str,
    description: &'static str,
    start: &'static str,
    end: &'static str,
}

struct SampleRecord {
    key: &'static str,
    name: &'static str,
    description: &'static str,
}

const SAMPLE_EVENTS: &[SampleEvent] = &[
    SampleEvent {
        key: "perseverance",
        title: "Perseverance lands in Jezero Crater",
        description: "Rover touches down to search for signs of ancient life.",
        start: "2021-02-18T20:55:00",
        end: "2021-02-18T20:55:00",
    },
    SampleEvent {
        key: "ingenuity",
        title: "Ingenuity first flight",
        description: "First powered, controlled flight on another planet.",
        start: "2021-04-19T07:34:00",
        end: "2021-04-19T07:35:00",
    },
    SampleEvent {
        key: "jwst_launch",
        title: "James Webb Space Telescope launch",
        description: "Ariane 5 lifts off from Kourou.",
        start: "2021-12-25T12:20:00",
        end: "2021-12-25T12:20:00",
    },
    SampleEvent {
        key: "jwst_images",
        title: "Webb first full-color images",
        description: "Release of the first science-quality images.",
        start: "2022-07-12T14:30:00",
        end: "2022-07-12T14:30:00",
    },
    SampleEvent {
        key: "dart",
        title: "DART impacts Dimorphos",
        description: "First planetary defense test of kinetic impact deflection.",
        start: "2022-09-26T23:14:00",
        end: "2022-09-26T23:14:00",
    },
    SampleEvent {
        key: "artemis",
        title: "Artemis I mission",
        description: "Uncrewed Orion flight around the Moon and back.",
        start: "2022-11-16T06:47:00",
        end: "2022-12-11T17:40:00",
    },
    SampleEvent {
        key: "chandrayaan",
        title: "Chandrayaan-3 lands near the lunar south pole",
        description: "Vikram lander touches down; Pragyan rover deploys.",
        start: "2023-08-23T12:33:00",
        end: "2023-09-03T00:00:00",
    },
];

const SAMPLE_ENTITIES: &[SampleRecord] = &[
    SampleRecord {
        key: "nasa",
        name: "NASA",
        description: "United States space agency.",
    },
    SampleRecord {
        key: "esa",
        name: "ESA",
        description: "European Space Agency.",
    },
    SampleRecord {
        key: "isro",
        name: "ISRO",
        description: "Indian Space Research Organisation.",
    },
    SampleRecord {
        key: "jezero",
        name: "Jezero Crater",
        description: "Ancient lake basin on Mars.",
    },
    SampleRecord {
        key: "moon",
        name: "The Moon",
        description: "Earth's natural satellite.",
    },
];

const SAMPLE_TAGS: &[SampleRecord] = &[
    SampleRecord {
        key: "mars",
        name: "mars",
        description: "Missions to Mars.",
    },
    SampleRecord {
        key: "telescope",
        name: "telescope",
        description: "Space observatories.",
    },
    SampleRecord {
        key: "lunar",
        name: "lunar",
        description: "Missions to the Moon.",
    },
    SampleRecord {
        key: "defense",
        name: "planetary-defense",
        description: "Protecting Earth from impacts.",
    },
];

const SAMPLE_EVENT_RELATIONS: &[(&str, &str)] = &[
    ("ingenuity", "perseverance"),
    ("jwst_images", "jwst_launch"),
    ("chandrayaan", "artemis"),
];

const SAMPLE_EVENT_ENTITIES: &[(&str, &str)] = &[
    ("perseverance", "nasa"),
    ("perseverance", "jezero"),
    ("ingenuity", "nasa"),
    ("ingenuity", "jezero"),
    ("jwst_launch", "nasa"),
    ("jwst_launch", "esa"),
    ("jwst_images", "nasa"),
    ("dart", "nasa"),
    ("artemis", "nasa"),
    ("artemis", "esa"),
    ("artemis", "moon"),
    ("chandrayaan", "isro"),
    ("chandrayaan", "moon"),
];

const SAMPLE_EVENT_TAGS: &[(&str, &str)] = &[
    ("perseverance", "mars"),
    ("ingenuity", "mars"),
    ("jwst_launch", "telescope"),
    ("jwst_images", "telescope"),
    ("dart", "defense"),
    ("artemis", "lunar"),
    ("chandrayaan", "lunar"),
];

/// Inserts the sample records and edges. Callers wrap this in a transaction.
pub(crate) fn insert_sample_data(conn: &Connection) -> StoreResult<()> {
    let mut event_ids = HashMap::new();
    for sample in SAMPLE_EVENTS {
        // Normalize through the codec so seeded rows match the canonical form.
        let start = format_date_time(&parse_sample_date(sample.start)?);
        let end = format_date_time(&parse_sample_date(sample.end)?);
        conn.execute(
            "INSERT INTO events (title, description, start_date_time, end_date_time)
             VALUES (?1, ?2, ?3, ?4);",
            params![sample.title, sample.description, start, end],
        )?;
        event_ids.insert(sample.key, conn.last_insert_rowid());
    }

    let entity_ids = insert_named(conn, "entities", SAMPLE_ENTITIES)?;
    let tag_ids = insert_named(conn, "tags", SAMPLE_TAGS)?;

    link_samples(conn, RelationKind::Event, SAMPLE_EVENT_RELATIONS, &event_ids, &event_ids)?;
    link_samples(conn, RelationKind::Entity, SAMPLE_EVENT_ENTITIES, &event_ids, &entity_ids)?;
    link_samples(conn, RelationKind::Tag, SAMPLE_EVENT_TAGS, &event_ids, &tag_ids)?;
    Ok(())
}

fn insert_named(
    conn: &Connection,
    table: &str,
    samples: &[SampleRecord],
) -> StoreResult<HashMap<&'static str, i64>> {
    let mut ids = HashMap::new();
    for sample in samples {
        conn.execute(
            &format!("INSERT INTO {table} (name, description) VALUES (?1, ?2);"),
            params![sample.name, sample.description],
        )?;
        ids.insert(sample.key, conn.last_insert_rowid());
    }
    Ok(ids)
}

fn link_samples(
    conn: &Connection,
    kind: RelationKind,
    pairs: &[(&'static str, &'static str)],
    sources: &HashMap<&'static str, i64>,
    targets: &HashMap<&'static str, i64>,
) -> StoreResult<()> {
    for (source_key, target_key) in pairs {
        let source = lookup(sources, source_key)?;
        let target = lookup(targets, target_key)?;
        link(conn, kind, source, target)?;
    }
    Ok(())
}

fn lookup(ids: &HashMap<&'static str, i64>, key: &str) -> StoreResult<i64> {
    ids.get(key)
        .copied()
        .ok_or_else(|| StoreError::InvalidData(format!("unknown sample key `{key}`")))
}

fn parse_sample_date(text: &str) -> StoreResult<chrono::NaiveDateTime> {
    parse_date_time(text).map_err(|err| StoreError::InvalidData(err.to_string()))
}

/// Number of sample events inserted by [`insert_sample_data`].
pub fn sample_event_count() -> usize {
    SAMPLE_EVENTS.len()
}
