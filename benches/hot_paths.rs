//! Benchmarks for the per-gesture paths: hash parsing and formatting, query
//! rewriting, tile URLs and style assembly.
//!
//! Run with: cargo bench --bench hot_paths

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use naip_map::camera::CameraState;
use naip_map::codec::{format_view_state_hash, parse_view_state_from_hash, write_query_params, MOSAIC_PARAM};
use naip_map::registry::MosaicRegistry;
use naip_map::style::{build_map_style, StyleDocument, StyleSettings};
use naip_map::tile_url::{build_tile_url, DEFAULT_COLOR_OPS, DEFAULT_TILE_TEMPLATE};

// =============================================================================
// VIEW STATE CODEC
// =============================================================================

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    group.bench_function("parse_hash_three_fields", |b| {
        b.iter(|| parse_view_state_from_hash(black_box("#13/36.07832/-111.8695")))
    });

    group.bench_function("parse_hash_five_fields", |b| {
        b.iter(|| parse_view_state_from_hash(black_box("#15.5/40.01234/-105.27/45.5/30")))
    });

    group.bench_function("format_hash_rotated", |b| {
        let mut camera = CameraState::new(40.01234, -105.27, 15.5);
        camera.bearing = 45.5;
        camera.pitch = 30.0;
        b.iter(|| format_view_state_hash(black_box(&camera)))
    });

    group.bench_function("write_query_replace", |b| {
        b.iter(|| {
            write_query_params(
                black_box("/?foo=bar&mosaic=2011-2013#13/36.07832/-111.8695"),
                [(MOSAIC_PARAM, "2016-2018")],
            )
        })
    });

    group.finish();
}

// =============================================================================
// TILES AND STYLE
// =============================================================================

fn bench_style(c: &mut Criterion) {
    let mut group = c.benchmark_group("style");
    let registry = MosaicRegistry::default();
    let settings = StyleSettings::default();

    group.bench_function("build_tile_url", |b| {
        let entry = registry.resolve_or_default("2016-2018", "2016-2018");
        b.iter(|| {
            build_tile_url(
                black_box(entry.full_res_url),
                DEFAULT_TILE_TEMPLATE,
                [("color_ops", DEFAULT_COLOR_OPS)],
            )
        })
    });

    group.bench_function("parse_embedded_style", |b| b.iter(StyleDocument::embedded));

    group.bench_function("build_map_style", |b| {
        let base = StyleDocument::embedded().expect("embedded style parses");
        b.iter(|| build_map_style(black_box(&base), "2014-2015", &registry, &settings))
    });

    group.finish();
}

criterion_group!(benches, bench_codec, bench_style);
criterion_main!(benches);
