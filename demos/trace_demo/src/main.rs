// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Synthetic app launch run through the whole analysis pipeline.
//!
//! Builds a layer capture of a launcher-to-app transition in which the status
//! bar drops out for one frame, encodes it with
//! [`TraceWriter`](flicker_core::wire::TraceWriter), parses it back with a
//! [`PrettyPrintSink`](flicker_debug::pretty::PrettyPrintSink) attached, runs
//! assertions, and exports the reconstructed trace as JSON.

use std::fs::File;
use std::io::BufWriter;

use flicker_assert::TraceSubject;
use flicker_core::diag::Diagnostics;
use flicker_core::error::OrphanError;
use flicker_core::node::{LayerRecord, Record};
use flicker_core::region::RectRegion;
use flicker_core::wire::{TraceKind, TraceWriter};
use flicker_core::{BuildOptions, Trace};

use flicker_debug::pretty::{PrettyPrintSink, dump_snapshot};

const FRAME_COUNT: i64 = 12;
/// Frame interval in nanoseconds (~60 Hz).
const FRAME_INTERVAL_NS: i64 = 16_666_667;
/// Frame at which the app surface replaces the launcher.
const SWITCH_FRAME: i64 = 5;
/// Frame at which the status bar goes missing.
const GLITCH_FRAME: i64 = 8;

const SCREEN: RectRegion = RectRegion::new(0, 0, 1080, 2340);
const STATUS_BAR: RectRegion = RectRegion::new(0, 0, 1080, 80);
const CONTENT: RectRegion = RectRegion::new(0, 80, 1080, 2340);

fn surface(id: i32, parent: i32, name: &str, rect: RectRegion) -> Record {
    Record::layer(id, parent, name, LayerRecord::with_region(rect))
}

fn frame(index: i64) -> Vec<Record> {
    let mut records = vec![Record::layer(1, -1, "Display Root#0", LayerRecord::default())];
    if index != GLITCH_FRAME {
        records.push(surface(2, 1, "StatusBar#12", STATUS_BAR));
    }
    if index < SWITCH_FRAME {
        records.push(surface(3, 1, "com.android.launcher/.Launcher#20", CONTENT));
    } else {
        let task = LayerRecord {
            has_buffer: false,
            ..LayerRecord::default()
        };
        records.push(Record::layer(4, 1, "Task=31", task));
        records.push(surface(5, 4, "com.example.app/.MainActivity#33", CONTENT));
    }
    // A leftover surface from a torn-down window whose parent was not captured.
    if index == 0 {
        records.push(surface(40, 999, "Splash Screen#40", CONTENT));
    }
    // Emit children before parents to exercise forward references.
    records.reverse();
    records
}

fn main() {
    // -- capture ------------------------------------------------------------
    let mut writer = TraceWriter::new(TraceKind::Layers);
    for index in 0..FRAME_COUNT {
        writer.push_entry(index * FRAME_INTERVAL_NS, &frame(index));
    }
    let bytes = writer.into_bytes();
    println!("Encoded {FRAME_COUNT} entries ({} bytes)", bytes.len());

    // -- parse --------------------------------------------------------------
    let mut pretty = PrettyPrintSink::with_writer(std::io::stdout());
    let mut accept_orphan = |orphan: &OrphanError| {
        println!(
            "accepting orphaned children {:?} of missing parent {}",
            orphan.child_ids, orphan.parent_id
        );
        true
    };
    let mut options = BuildOptions::with_orphan_callback(&mut accept_orphan);
    let trace = Trace::parse_with(&bytes, &mut options, &mut Diagnostics::new(&mut pretty))
        .expect("synthesized trace should parse")
        .with_source("synthetic launch");

    // -- assertions ---------------------------------------------------------
    let launch = TraceSubject::new(&trace)
        .shows_layer("Launcher")
        .then()
        .shows_layer("MainActivity")
        .hides_layer("Launcher")
        .check();
    println!(
        "launch transition: {}",
        if launch.is_ok() { "ok" } else { "FAILED" }
    );

    let stable = TraceSubject::new(&trace)
        .shows_layer("StatusBar")
        .covers_region(SCREEN)
        .check();
    match &stable {
        Ok(()) => println!("status bar stable: ok"),
        Err(failure) => println!("status bar stable: {failure}"),
    }

    if let Err(failure) = stable
        && let Some(first) = failure.failures.first()
    {
        let snapshot = trace
            .entry(first.timestamp)
            .expect("failure timestamps come from the trace");
        dump_snapshot(snapshot, &mut std::io::stdout()).expect("failed to write snapshot dump");
    }

    // -- export -------------------------------------------------------------
    let path = "flicker_trace.json";
    let file = File::create(path).expect("failed to create flicker_trace.json");
    let mut out = BufWriter::new(file);
    flicker_debug::json::export(&trace, &mut out).expect("failed to write JSON export");

    println!("Wrote {path} ({} snapshots)", trace.len());
}
