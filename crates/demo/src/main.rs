// File: crates/demo/src/main.rs
// Summary: Demo loads OHLC CSV, drives a drawing session (draw, align, undo) through the
// overlay store with file persistence, prints labels, and writes SVG (PNG with `png`).

use anyhow::{Context, Result};
use overlay_core::geometry::Edge;
use overlay_core::lod::{bucket_count_for, downsample_candles_min_max};
use overlay_core::svg::shapes_to_nodes;
use overlay_core::{
    describe_drawing, CandleLike, CoordinateMapper, DomainPoint, DrawingStore, FileStorage, Geometry, OverlayConfig,
    PxPoint, Scope, ShapeKind, SvgDocument, TimeInput, TimeScale, Tool, ValueScale,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const WIDTH: f64 = 1024.0;
const HEIGHT: f64 = 640.0;
const MARGIN: f64 = 40.0;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Usage: overlay-demo [ohlc.csv] [config.json]
    let mut args = std::env::args().skip(1);
    let csv_arg = args.next();
    let config = match args.next() {
        Some(p) => OverlayConfig::load_from_path(&p).with_context(|| format!("loading config '{p}'"))?,
        None => OverlayConfig::default(),
    };

    let (candles, stem) = match csv_arg {
        Some(raw) => {
            let path = resolve_path(&raw)?;
            let candles = load_ohlc_csv(&path).with_context(|| format!("failed to load CSV '{}'", path.display()))?;
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("chart").to_string();
            (candles, stem)
        }
        None => (synthetic_candles(400), "synthetic".to_string()),
    };
    if candles.is_empty() {
        anyhow::bail!("no candles loaded; check headers/delimiter.");
    }
    tracing::info!(count = candles.len(), "loaded candles");

    // Level of detail for the plot width.
    let plot_w = WIDTH - 2.0 * MARGIN;
    let target = bucket_count_for(plot_w, config.px_per_bucket);
    let visible = downsample_candles_min_max(&candles, target);
    tracing::info!(target, visible = visible.len(), "downsampled");

    let mapper = build_mapper(&visible);

    // Drawing session persisted under target/out/drawings.
    let storage = FileStorage::new("target/out/drawings");
    let mut store = DrawingStore::new(storage, config.clone(), Scope::new(stem.as_str(), "default"));
    store.subscribe(|state| tracing::debug!(shapes = state.shapes().len(), "state changed"));
    if !store.shapes().is_empty() {
        tracing::info!(restored = store.shapes().len(), "clearing drawings from a previous run");
        store.clear();
    }
    run_session(&mut store, &mapper, &visible)?;

    for shape in store.shapes() {
        if let Some(label) = describe_drawing(shape, &mapper, &config.labels) {
            println!("{} {:<10} {}", shape.id, shape.kind().name(), label.text);
        }
    }

    let projected: Vec<_> = store.shapes().iter().filter_map(|s| mapper.project(s)).collect();
    let svg = SvgDocument::new(WIDTH, HEIGHT).render(&shapes_to_nodes(&projected, WIDTH, HEIGHT));
    let out_svg = out_name_with(&stem, "overlay", "svg");
    std::fs::write(&out_svg, svg).with_context(|| format!("write {}", out_svg.display()))?;
    println!("Wrote {}", out_svg.display());

    #[cfg(feature = "png")]
    {
        use overlay_render_skia::{OverlayRenderer, RenderOptions, Scene};
        let scene = Scene { candles: &visible, shapes: store.shapes(), selection: store.selection(), mapper: &mapper };
        let opts = RenderOptions { width: WIDTH as i32, height: HEIGHT as i32, labels: config.labels, ..Default::default() };
        let out_png = out_name_with(&stem, "overlay", "png");
        OverlayRenderer::new().render_to_png(&scene, &opts, &out_png)?;
        println!("Wrote {}", out_png.display());
    }

    Ok(())
}

/// Draw a few shapes the way a pointer would, then align and undo.
fn run_session(store: &mut DrawingStore<FileStorage>, mapper: &CoordinateMapper, candles: &[CandleLike]) -> Result<()> {
    let at = |x: f64, y: f64| PxPoint::new(x, y);
    store.set_snap(true);

    store.set_tool(Tool::Shape(ShapeKind::Trendline));
    let a = store.resolve_input(at(MARGIN + 60.0, HEIGHT * 0.7), mapper).context("unmappable trendline start")?;
    let b = store.resolve_input(at(WIDTH * 0.6, HEIGHT * 0.3), mapper).context("unmappable trendline end")?;
    store.start_drawing(a);
    let trend = store.add_point(b).context("trendline not committed")?;

    let high = candles.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
    let last_t = candles.last().map(|c| c.time).unwrap_or(0.0);
    store.add_shape(Geometry::Hline { points: [DomainPoint::new(last_t, high)] });

    store.set_tool(Tool::Shape(ShapeKind::Rect));
    let r0 = store.resolve_input(at(WIDTH * 0.65, HEIGHT * 0.45), mapper).context("unmappable rect corner")?;
    let r1 = store.resolve_input(at(WIDTH * 0.85, HEIGHT * 0.25), mapper).context("unmappable rect corner")?;
    store.start_drawing(r0);
    let rect = store.add_point(r1).context("rect not committed")?;
    let entry = (r0.p + r1.p) / 2.0;
    store.update_shape(rect, |s| {
        if let Geometry::Rect { entry: e, .. } = &mut s.geometry {
            *e = Some(entry);
        }
    });
    store.set_tool(Tool::Cursor);

    store.set_selection(&[trend, rect]);
    store.align_selected(Edge::Top, mapper);
    tracing::info!(can_undo = store.can_undo(), "aligned selection to top");
    store.undo();
    tracing::info!(shapes = store.shapes().len(), can_redo = store.can_redo(), "undid alignment");

    if let Some(hit) = store.select_at(at(WIDTH * 0.75, HEIGHT * 0.45), mapper, false) {
        tracing::info!(%hit, "picked shape under pointer");
    }
    Ok(())
}

fn build_mapper(candles: &[CandleLike]) -> CoordinateMapper {
    let n = candles.len().max(1) as f64;
    let first = candles.first().map(|c| c.time).unwrap_or(0.0);
    let last = candles.last().map(|c| c.time).unwrap_or(first);
    let bar_seconds = if n > 1.0 { ((last - first) / (n - 1.0)).max(f64::EPSILON) } else { 1.0 };
    let spacing = (WIDTH - 2.0 * MARGIN) / n;
    let time = TimeScale::new(MARGIN + spacing / 2.0, first, bar_seconds, spacing);

    let (lo, hi) = candles.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| (lo.min(c.low), hi.max(c.high)));
    let pad = (hi - lo).abs().max(1e-9) * 0.05;
    let value = ValueScale::new_linear(MARGIN, HEIGHT - MARGIN, lo - pad, hi + pad);

    let mut mapper = CoordinateMapper::from_scales(time, value);
    mapper.set_visible_bar_coords(&time.bar_coords(candles.iter().map(|c| c.time)));
    let levels: Vec<f64> = candles.iter().flat_map(|c| [c.open, c.high, c.low, c.close]).collect();
    mapper.set_visible_price_levels(&levels);
    mapper
}

fn resolve_path(raw: &str) -> Result<PathBuf> {
    let p = Path::new(raw);
    if p.exists() {
        return Ok(p.to_path_buf());
    }
    anyhow::bail!("file not found: {}", p.display());
}

/// Output file like target/out/overlay_<stem>_<suffix>.<ext>
fn out_name_with(stem: &str, suffix: &str, ext: &str) -> PathBuf {
    let short = stem.split('_').take(3).collect::<Vec<_>>().join("_");
    let mut out = PathBuf::from("target/out");
    std::fs::create_dir_all(&out).ok();
    out.push(format!("overlay_{short}_{suffix}.{ext}"));
    out
}

/// Load Binance-like OHLC CSV; rows missing a price column are skipped.
fn load_ohlc_csv(path: &Path) -> Result<Vec<CandleLike>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let headers = rdr.headers()?.iter().map(|h| h.trim().to_lowercase()).collect::<Vec<_>>();
    tracing::debug!(?headers, "csv headers");

    let idx = |names: &[&str]| headers.iter().position(|h| names.contains(&h.as_str()));
    let i_time = idx(&["time", "timestamp", "open_time", "date", "datetime"]);
    let i_open = idx(&["open", "o"]);
    let i_high = idx(&["high", "h"]);
    let i_low = idx(&["low", "l"]);
    let i_close = idx(&["close", "c", "adj_close", "close_price"]);
    let i_volume = idx(&["volume", "vol", "v"]);

    if i_open.is_none() || i_high.is_none() || i_low.is_none() || i_close.is_none() {
        tracing::warn!("could not find one of open/high/low/close columns");
    }

    let mut out = Vec::new();
    for (row, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let parse = |i: Option<usize>| i.and_then(|ix| rec.get(ix)).and_then(|s| s.trim().parse::<f64>().ok());
        let time = i_time.and_then(|ix| rec.get(ix)).and_then(parse_time).unwrap_or(row as f64);
        if let (Some(open), Some(high), Some(low), Some(close)) = (parse(i_open), parse(i_high), parse(i_low), parse(i_close)) {
            out.push(CandleLike { time, open, high, low, close, volume: parse(i_volume).unwrap_or(0.0) });
        }
    }
    Ok(out)
}

/// Epoch seconds from integer seconds, integer milliseconds or `YYYY-MM-DD`.
fn parse_time(s: &str) -> Option<f64> {
    let s = s.trim();
    if let Ok(n) = s.parse::<i64>() {
        // epoch ms -> sec
        if n > 10_i64.pow(12) { return Some(n as f64 / 1000.0); }
        return Some(n as f64);
    }
    overlay_core::time::to_seconds(&TimeInput::from(s))
}

fn synthetic_candles(n: usize) -> Vec<CandleLike> {
    let start = 1_704_067_200.0;
    let mut close = 100.0_f64;
    (0..n)
        .map(|i| {
            let open = close;
            close = open + (i as f64 * 0.37).sin() * 1.5 + (i as f64 * 0.05).cos() * 0.4;
            let high = open.max(close) + 0.8;
            let low = open.min(close) - 0.8;
            CandleLike { time: start + i as f64 * 3600.0, open, high, low, close, volume: 1_000.0 + i as f64 }
        })
        .collect()
}
