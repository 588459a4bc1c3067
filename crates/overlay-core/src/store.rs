// File: crates/overlay-core/src/store.rs
// Summary: Drawing store: shape CRUD, selection, drafting, undo/redo, scoped persistence, subscription.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::OverlayConfig;
use crate::geometry::{self, Axis, Edge};
use crate::grid::snap_px_to_grid;
use crate::history::History;
use crate::mapper::CoordinateMapper;
use crate::shape::{DomainShape, Geometry, PixelShape, Shape, ShapeId, ShapeKind};
use crate::storage::{decode_shapes, encode_shapes, storage_key, MemoryStorage, ShapeStorage};
use crate::time::to_seconds;
use crate::types::{DomainPoint, PxPoint};

/// Active input mode: selecting, or drawing shapes of one kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "mode", content = "kind")]
pub enum Tool {
    #[default]
    Cursor,
    Shape(ShapeKind),
}

/// The (symbol, timeframe) pair a store's shapes belong to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Scope {
    pub symbol: String,
    pub timeframe: String,
}

impl Scope {
    pub fn new(symbol: impl Into<String>, timeframe: impl Into<String>) -> Self {
        Self { symbol: symbol.into(), timeframe: timeframe.into() }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.symbol, self.timeframe)
    }
}

/// Points collected so far for a shape under construction.
#[derive(Clone, Debug, PartialEq)]
pub struct Draft {
    pub kind: ShapeKind,
    pub points: Vec<DomainPoint>,
}

impl Draft {
    /// Points padded (or truncated) to the kind's arity by repeating the last one.
    fn completed(&self, extra: Option<DomainPoint>) -> Option<Vec<DomainPoint>> {
        let mut pts = self.points.clone();
        pts.extend(extra);
        let last = *pts.last()?;
        pts.resize(self.kind.arity(), last);
        Some(pts)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum DrawPhase {
    #[default]
    Idle,
    Drawing(Draft),
}

/// Observable state handed to listeners.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawingState {
    shapes: Vec<DomainShape>,
    selected: Vec<ShapeId>,
    tool: Tool,
    snap: bool,
    grid: bool,
    phase: DrawPhase,
}

impl DrawingState {
    /// Shapes in z-order; later entries draw on top.
    pub fn shapes(&self) -> &[DomainShape] { &self.shapes }
    pub fn selection(&self) -> &[ShapeId] { &self.selected }
    pub fn tool(&self) -> Tool { self.tool }
    pub fn snap(&self) -> bool { self.snap }
    pub fn grid(&self) -> bool { self.grid }
    pub fn phase(&self) -> &DrawPhase { &self.phase }

    pub fn draft(&self) -> Option<&Draft> {
        match &self.phase {
            DrawPhase::Drawing(d) => Some(d),
            DrawPhase::Idle => None,
        }
    }

    pub fn shape(&self, id: ShapeId) -> Option<&DomainShape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    pub fn is_selected(&self, id: ShapeId) -> bool { self.selected.contains(&id) }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&DrawingState)>;

pub struct DrawingStore<S: ShapeStorage = MemoryStorage> {
    config: OverlayConfig,
    storage: S,
    scope: Scope,
    state: DrawingState,
    history: History<Vec<DomainShape>>,
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
    dirty: bool,
}

impl<S: ShapeStorage> fmt::Debug for DrawingStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawingStore")
            .field("scope", &self.scope)
            .field("state", &self.state)
            .field("undo", &self.history.undo_len())
            .field("redo", &self.history.redo_len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl DrawingStore<MemoryStorage> {
    pub fn in_memory(scope: Scope) -> Self {
        Self::new(MemoryStorage::new(), OverlayConfig::default(), scope)
    }
}

fn next_id_after(shapes: &[DomainShape]) -> u64 {
    shapes.iter().map(|s| s.id.0 + 1).max().unwrap_or(1).max(1)
}

impl<S: ShapeStorage> DrawingStore<S> {
    /// Open `scope`, loading whatever `storage` holds for it.
    pub fn new(storage: S, config: OverlayConfig, scope: Scope) -> Self {
        let history = History::with_limit(config.history_limit);
        let mut store = Self {
            config,
            storage,
            scope,
            state: DrawingState::default(),
            history,
            next_id: 1,
            listeners: Vec::new(),
            next_subscription: 0,
            dirty: true,
        };
        store.state.shapes = store.load_current();
        store.next_id = next_id_after(&store.state.shapes);
        store
    }

    pub fn state(&self) -> &DrawingState { &self.state }
    pub fn shapes(&self) -> &[DomainShape] { &self.state.shapes }
    pub fn selection(&self) -> &[ShapeId] { &self.state.selected }
    pub fn tool(&self) -> Tool { self.state.tool }
    pub fn snap(&self) -> bool { self.state.snap }
    pub fn grid(&self) -> bool { self.state.grid }
    pub fn scope(&self) -> &Scope { &self.scope }
    pub fn config(&self) -> &OverlayConfig { &self.config }
    pub fn storage(&self) -> &S { &self.storage }
    pub fn can_undo(&self) -> bool { self.history.can_undo() }
    pub fn can_redo(&self) -> bool { self.history.can_redo() }

    fn key(&self) -> String {
        storage_key(&self.config.namespace, &self.scope.symbol, &self.scope.timeframe)
    }

    // ----- subscription ---------------------------------------------------

    /// Register `listener`; it is called right away and after every change.
    pub fn subscribe(&mut self, listener: impl FnMut(&DrawingState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        let mut listener: Listener = Box::new(listener);
        listener(&self.state);
        self.listeners.push((id, listener));
        id
    }

    /// Returns whether a listener was removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Whether anything changed since the last call; clears the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn is_dirty(&self) -> bool { self.dirty }

    fn changed(&mut self) {
        self.dirty = true;
        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.state);
        }
    }

    // ----- persistence ----------------------------------------------------

    /// Shapes stored for the current scope. Missing or malformed content
    /// yields an empty list.
    pub fn load_current(&self) -> Vec<DomainShape> {
        let key = self.key();
        match self.storage.get(&key) {
            Ok(Some(raw)) if raw.trim().is_empty() => Vec::new(),
            Ok(Some(raw)) => decode_shapes(&raw).unwrap_or_else(|e| {
                tracing::warn!(key = %key, error = %e, "discarding malformed stored shapes");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "failed to read stored shapes");
                Vec::new()
            }
        }
    }

    fn persist(&mut self) {
        let key = self.key();
        let result = encode_shapes(&self.state.shapes).and_then(|raw| self.storage.set(&key, &raw));
        if let Err(e) = result {
            tracing::warn!(key = %key, error = %e, "failed to persist shapes");
        }
    }

    /// Switch to another symbol/timeframe. Draft, selection and history are
    /// dropped and the shapes are replaced by the new scope's stored list.
    pub fn set_scope(&mut self, symbol: &str, timeframe: &str) {
        let scope = Scope::new(symbol, timeframe);
        if scope == self.scope { return; }
        tracing::debug!(from = %self.scope, to = %scope, "switching scope");
        self.scope = scope;
        self.history.clear();
        self.state.phase = DrawPhase::Idle;
        self.state.selected.clear();
        self.state.shapes = self.load_current();
        self.next_id = next_id_after(&self.state.shapes);
        self.changed();
    }

    // ----- shape mutations ------------------------------------------------

    fn commit_shapes(&mut self, next: Vec<DomainShape>) {
        let before = std::mem::replace(&mut self.state.shapes, next);
        self.history.record(before);
        self.prune_selection();
        self.persist();
        self.changed();
    }

    fn alloc_id(&mut self) -> ShapeId {
        let id = ShapeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Append a new shape on top and return its id.
    pub fn add_shape(&mut self, geometry: Geometry<DomainPoint>) -> ShapeId {
        self.add_shape_with(Shape::new(ShapeId(0), geometry))
    }

    /// Append `shape` keeping its style, layer and flags. The id is always
    /// assigned by the store.
    pub fn add_shape_with(&mut self, mut shape: DomainShape) -> ShapeId {
        shape.id = self.alloc_id();
        let id = shape.id;
        tracing::debug!(id = %id, kind = %shape.kind(), "shape added");
        let mut next = self.state.shapes.clone();
        next.push(shape);
        self.commit_shapes(next);
        id
    }

    /// Edit one shape in place. Updates that change the id or the kind are
    /// rejected; updates that change nothing are not recorded.
    pub fn update_shape(&mut self, id: ShapeId, update: impl FnOnce(&mut DomainShape)) -> bool {
        let Some(idx) = self.state.shapes.iter().position(|s| s.id == id) else { return false };
        let original = &self.state.shapes[idx];
        let mut edited = original.clone();
        update(&mut edited);
        if edited.id != original.id || edited.kind() != original.kind() {
            tracing::warn!(id = %id, "rejected update that changes shape identity or kind");
            return false;
        }
        if edited == *original { return false; }
        let mut next = self.state.shapes.clone();
        next[idx] = edited;
        self.commit_shapes(next);
        true
    }

    /// Replace the whole list. Later duplicates of an id are dropped.
    pub fn replace_shapes(&mut self, shapes: Vec<DomainShape>) {
        let mut seen = HashSet::with_capacity(shapes.len());
        let before = shapes.len();
        let shapes: Vec<DomainShape> = shapes.into_iter().filter(|s| seen.insert(s.id)).collect();
        if shapes.len() != before {
            tracing::warn!(dropped = before - shapes.len(), "dropped shapes with duplicate ids");
        }
        self.next_id = self.next_id.max(next_id_after(&shapes));
        self.commit_shapes(shapes);
    }

    /// Delete the selected shapes; returns how many were removed.
    pub fn remove_selected(&mut self) -> usize {
        let sel: HashSet<ShapeId> = self.state.selected.iter().copied().collect();
        let next: Vec<DomainShape> = self.state.shapes.iter().filter(|s| !sel.contains(&s.id)).cloned().collect();
        let removed = self.state.shapes.len() - next.len();
        if removed == 0 { return 0; }
        tracing::debug!(removed, "removed selected shapes");
        self.commit_shapes(next);
        removed
    }

    pub fn clear(&mut self) {
        if self.state.shapes.is_empty() { return; }
        self.commit_shapes(Vec::new());
    }

    /// Shift selected, unlocked shapes by a domain delta.
    pub fn move_selected_by(&mut self, dt: f64, dp: f64) -> bool {
        if !(dt.is_finite() && dp.is_finite()) || (dt == 0.0 && dp == 0.0) { return false; }
        let mut next = self.state.shapes.clone();
        let mut moved = false;
        for shape in next.iter_mut().filter(|s| !s.locked && self.state.selected.contains(&s.id)) {
            let before = shape.geometry.clone();
            shape.translate(dt, dp);
            moved |= shape.geometry != before;
        }
        if !moved { return false; }
        self.commit_shapes(next);
        true
    }

    pub fn undo(&mut self) -> bool {
        let Some(prev) = self.history.undo(&self.state.shapes) else { return false };
        self.state.shapes = prev;
        self.after_history_step();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.history.redo(&self.state.shapes) else { return false };
        self.state.shapes = next;
        self.after_history_step();
        true
    }

    fn after_history_step(&mut self) {
        self.state.phase = DrawPhase::Idle;
        self.prune_selection();
        self.persist();
        self.changed();
    }

    // ----- selection ------------------------------------------------------

    fn prune_selection(&mut self) {
        let ids: HashSet<ShapeId> = self.state.shapes.iter().map(|s| s.id).collect();
        self.state.selected.retain(|id| ids.contains(id));
    }

    fn set_selected(&mut self, ids: Vec<ShapeId>) {
        if ids == self.state.selected { return; }
        self.state.selected = ids;
        self.changed();
    }

    /// Select exactly `ids`, dropping duplicates and unknown ids.
    pub fn set_selection(&mut self, ids: &[ShapeId]) {
        let known: HashSet<ShapeId> = self.state.shapes.iter().map(|s| s.id).collect();
        let mut seen = HashSet::new();
        let ids = ids.iter().copied().filter(|id| known.contains(id) && seen.insert(*id)).collect();
        self.set_selected(ids);
    }

    pub fn select_one(&mut self, id: Option<ShapeId>) {
        match id {
            Some(id) => self.set_selection(&[id]),
            None => self.clear_selection(),
        }
    }

    pub fn toggle(&mut self, id: ShapeId) {
        if self.state.shape(id).is_none() { return; }
        let mut ids = self.state.selected.clone();
        match ids.iter().position(|s| *s == id) {
            Some(pos) => {
                ids.remove(pos);
            }
            None => ids.push(id),
        }
        self.set_selected(ids);
    }

    pub fn clear_selection(&mut self) {
        self.set_selected(Vec::new());
    }

    // ----- tool and drafting ----------------------------------------------

    /// Switch tools. Any shape under construction is discarded.
    pub fn set_tool(&mut self, tool: Tool) {
        let had_draft = matches!(self.state.phase, DrawPhase::Drawing(_));
        if tool == self.state.tool && !had_draft { return; }
        self.state.tool = tool;
        self.state.phase = DrawPhase::Idle;
        self.changed();
    }

    pub fn set_snap(&mut self, snap: bool) {
        if snap == self.state.snap { return; }
        self.state.snap = snap;
        self.changed();
    }

    /// Snap pointer input to the pixel grid (`grid_step_px`).
    pub fn set_grid(&mut self, grid: bool) {
        if grid == self.state.grid { return; }
        self.state.grid = grid;
        self.changed();
    }

    /// Convert a pointer position into chart space. The pixel grid applies
    /// first; the bar and price magnets override it when snapping is on.
    pub fn resolve_input(&self, px: PxPoint, mapper: &CoordinateMapper) -> Option<DomainPoint> {
        let px = snap_px_to_grid(px, self.config.grid_step_px, self.state.grid);
        if self.state.snap {
            mapper.snap_domain_point(px, self.config.magnet_tolerance_px)
        } else {
            mapper.to_domain(px)
        }
    }

    /// Begin a shape of the current tool at `pt`. Single-point kinds are
    /// committed at once and their id returned.
    pub fn start_drawing(&mut self, pt: DomainPoint) -> Option<ShapeId> {
        let Tool::Shape(kind) = self.state.tool else { return None };
        self.state.phase = DrawPhase::Drawing(Draft { kind, points: vec![pt] });
        if kind.arity() == 1 { return self.finish_drawing(); }
        self.changed();
        None
    }

    /// Append a point; the shape is committed once it has all its points.
    pub fn add_point(&mut self, pt: DomainPoint) -> Option<ShapeId> {
        let DrawPhase::Drawing(draft) = &mut self.state.phase else { return None };
        draft.points.push(pt);
        if draft.points.len() >= draft.kind.arity() { return self.finish_drawing(); }
        self.changed();
        None
    }

    /// Commit the draft, padding missing points with the last one.
    pub fn finish_drawing(&mut self) -> Option<ShapeId> {
        let DrawPhase::Drawing(draft) = std::mem::take(&mut self.state.phase) else { return None };
        let geometry = draft.completed(None).and_then(|pts| Geometry::from_points(draft.kind, &pts));
        match geometry {
            Some(g) => Some(self.add_shape(g)),
            None => {
                self.changed();
                None
            }
        }
    }

    /// Abandon the draft without committing anything.
    pub fn cancel_drawing(&mut self) {
        if matches!(self.state.phase, DrawPhase::Idle) { return; }
        self.state.phase = DrawPhase::Idle;
        self.changed();
    }

    /// The draft as a shape with `cursor` as its next point, for rubber-banding.
    pub fn draft_preview(&self, cursor: DomainPoint) -> Option<DomainShape> {
        let draft = self.state.draft()?;
        let pts = draft.completed(Some(cursor))?;
        Geometry::from_points(draft.kind, &pts).map(|g| Shape::new(ShapeId(self.next_id), g))
    }

    // ----- pixel-space interaction ----------------------------------------

    fn project_all(&self, mapper: &CoordinateMapper) -> Option<Vec<PixelShape>> {
        self.state.shapes.iter().map(|s| mapper.project(s)).collect()
    }

    fn movable_selection(&self) -> Vec<ShapeId> {
        self.state
            .shapes
            .iter()
            .filter(|s| !s.locked && self.state.is_selected(s.id))
            .map(|s| s.id)
            .collect()
    }

    fn apply_pixel_edit(
        &mut self,
        mapper: &CoordinateMapper,
        edit: impl FnOnce(&[PixelShape], &[ShapeId]) -> Vec<PixelShape>,
    ) -> bool {
        let Some(before) = self.project_all(mapper) else {
            tracing::debug!("pixel edit skipped: a shape cannot be projected");
            return false;
        };
        let after = edit(&before, &self.movable_selection());
        let mut next = Vec::with_capacity(after.len());
        let mut changed = false;
        for ((orig, old), new) in self.state.shapes.iter().zip(&before).zip(&after) {
            if old == new {
                next.push(orig.clone());
                continue;
            }
            let Some(domain) = unproject_moved(orig, old, new, mapper) else { return false };
            next.push(domain);
            changed = true;
        }
        if !changed { return false; }
        self.commit_shapes(next);
        true
    }

    /// Line up selected shapes on `edge`. Needs two or more selected shapes.
    pub fn align_selected(&mut self, edge: Edge, mapper: &CoordinateMapper) -> bool {
        self.apply_pixel_edit(mapper, |shapes, sel| geometry::align(shapes, sel, edge))
    }

    /// Space selected shapes evenly along `axis`. Needs three or more.
    pub fn distribute_selected(&mut self, axis: Axis, mapper: &CoordinateMapper) -> bool {
        self.apply_pixel_edit(mapper, |shapes, sel| geometry::distribute(shapes, sel, axis))
    }

    /// Topmost visible shape under `px`.
    pub fn hit_test(&self, px: PxPoint, mapper: &CoordinateMapper) -> Option<ShapeId> {
        let projected: Vec<PixelShape> = self.state.shapes.iter().filter_map(|s| mapper.project(s)).collect();
        geometry::pick_topmost(&projected, px, self.config.hit_threshold_px)
    }

    /// Select the shape under `px`. `additive` toggles it in the current
    /// selection; otherwise it replaces the selection, and a miss clears it.
    pub fn select_at(&mut self, px: PxPoint, mapper: &CoordinateMapper, additive: bool) -> Option<ShapeId> {
        let hit = self.hit_test(px, mapper);
        match (hit, additive) {
            (Some(id), true) => self.toggle(id),
            (Some(id), false) => self.select_one(Some(id)),
            (None, true) => {}
            (None, false) => self.clear_selection(),
        }
        hit
    }
}

/// Chart-space copy of `orig` after its pixel form moved from `old` to `new`.
/// Only coordinates whose pixel value changed are converted back; the rest
/// keep their stored values bit for bit.
fn unproject_moved(
    orig: &DomainShape,
    old: &PixelShape,
    new: &PixelShape,
    mapper: &CoordinateMapper,
) -> Option<DomainShape> {
    let mut out = orig.clone();
    for ((d, o), n) in out.geometry.points_mut().iter_mut().zip(old.points()).zip(new.points()) {
        if n.x != o.x { d.t = to_seconds(&mapper.x_to_time(n.x)?)?; }
        if n.y != o.y { d.p = mapper.y_to_price(n.y)?; }
    }
    Some(out)
}
