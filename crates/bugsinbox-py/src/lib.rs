//! # Bugsinbox Python Bindings
//!
//! PyO3 bindings that let a Python/pyglet shell drive the simulation core.
//! The shell owns the window, sprites, sounds and key bindings; it calls
//! `tick` from its 30 Hz scheduler and reads positions back as NumPy arrays.
//!
//! ## Usage
//!
//! ```python
//! import _bugsinbox as bib
//!
//! sim = bib.Simulation(1280, 800, sample_count=50, seed=7, footprint=(120, 90))
//! sim.start()
//!
//! def update(dt):
//!     for cue in sim.tick(dt):
//!         if cue == "coalescence":
//!             sound.play()
//!     xy = sim.positions().reshape(-1, 2)
//!     for sprite, (x, y), heading in zip(sprites, xy, sim.headings()):
//!         sprite.update(x=x, y=y, rotation=-math.degrees(heading))
//!
//! # Timeline bar
//! bar = sim.normalized_history()
//! ```

use bugsinbox_core::entity::{Appearance, ImageVariant};
use bugsinbox_core::{SimConfig, SimError, Simulation};
use numpy::{PyArray1, ToPyArray};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

fn to_py_err(err: SimError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Negative counts become zero, which the core raises to one.
fn clamp_count(count: i64) -> usize {
    usize::try_from(count).unwrap_or(0)
}

/// Sprite appearance for the stock image at `image`, or a plain circle of
/// the same size when `image` is `None`.
fn appearance(image: Option<usize>, footprint: (f32, f32)) -> PyResult<Appearance> {
    let footprint = glam::Vec2::new(footprint.0, footprint.1);
    let look = match image {
        None => Appearance::Shape {
            radius: (footprint.x + footprint.y) / 4.0,
        },
        Some(index) => ImageVariant::from_index(index)
            .map(|image| Appearance::Sprite { image, footprint })
            .ok_or_else(|| {
                PyValueError::new_err(format!(
                    "image index {index} out of range 0..{}",
                    ImageVariant::ALL.len()
                ))
            })?,
    };
    look.validate().map_err(to_py_err)?;
    Ok(look)
}

/// Simulation wrapper for Python.
#[pyclass(name = "Simulation")]
pub struct PySimulation {
    inner: Simulation,
}

#[pymethods]
impl PySimulation {
    /// Create a stopped simulation for a viewport of `width` × `height`.
    ///
    /// `image` indexes `image_files()`; `None` draws circles.
    #[new]
    #[pyo3(signature = (width, height, sample_count=100, seed=None, footprint=(64.0, 64.0), image=Some(0)))]
    fn new(
        width: f32,
        height: f32,
        sample_count: i64,
        seed: Option<u64>,
        footprint: (f32, f32),
        image: Option<usize>,
    ) -> PyResult<Self> {
        let config = SimConfig {
            seed,
            sample_count: clamp_count(sample_count),
            ..Default::default()
        };
        let look = appearance(image, footprint)?;
        let inner = Simulation::with_appearance(config, glam::Vec2::new(width, height), look)
            .map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Asset file names of the stock images, by index.
    #[staticmethod]
    fn image_files() -> Vec<&'static str> {
        ImageVariant::ALL.iter().map(|v| v.file_name()).collect()
    }

    /// Advance by `dt` seconds. Returns the cues produced ("coalescence", "spawn").
    fn tick(&mut self, dt: f32) -> Vec<&'static str> {
        self.inner.tick(dt).cues().into_iter().map(|c| c.name()).collect()
    }

    // Commands

    fn resize_arena(&mut self, delta: f32) {
        self.inner.resize_arena(delta);
    }

    fn grow_arena(&mut self) {
        self.inner.grow_arena();
    }

    fn shrink_arena(&mut self) {
        self.inner.shrink_arena();
    }

    fn on_viewport_resize(&mut self, width: f32, height: f32) {
        self.inner.on_viewport_resize(width, height);
    }

    /// Add one bug. Returns its id.
    fn add_entity(&mut self) -> u64 {
        self.inner.add_entity().as_u64()
    }

    /// Remove the newest founder. Returns its id, or `None` if there was none.
    fn remove_last_entity(&mut self) -> Option<u64> {
        self.inner.remove_last_entity().map(|id| id.as_u64())
    }

    fn set_global_scale(&mut self, scale: f32) {
        self.inner.set_global_scale(scale);
    }

    fn grow_entities(&mut self) {
        self.inner.grow_entities();
    }

    fn shrink_entities(&mut self) {
        self.inner.shrink_entities();
    }

    #[pyo3(signature = (image, footprint))]
    fn change_image(&mut self, image: Option<usize>, footprint: (f32, f32)) -> PyResult<()> {
        self.inner.change_appearance(appearance(image, footprint)?);
        Ok(())
    }

    fn toggle_chase_mode(&mut self) {
        self.inner.toggle_chase_mode();
    }

    fn toggle_procreate_mode(&mut self) {
        self.inner.toggle_procreate_mode();
    }

    fn start(&mut self) {
        self.inner.start();
    }

    fn stop(&mut self) {
        self.inner.stop();
    }

    fn toggle_running(&mut self) {
        self.inner.toggle_running();
    }

    /// Reseed `sample_count` bugs and clear the history.
    #[pyo3(signature = (sample_count, image=Some(0), footprint=(64.0, 64.0)))]
    fn restart(
        &mut self,
        sample_count: i64,
        image: Option<usize>,
        footprint: (f32, f32),
    ) -> PyResult<()> {
        let look = appearance(image, footprint)?;
        self.inner.restart(clamp_count(sample_count), look);
        Ok(())
    }

    /// Restart with the mouse lemur image of the given size.
    fn restart_cute(&mut self, sample_count: i64, footprint: (f32, f32)) -> PyResult<()> {
        let footprint = glam::Vec2::new(footprint.0, footprint.1);
        Appearance::Sprite {
            image: ImageVariant::MouseLemur,
            footprint,
        }
        .validate()
        .map_err(to_py_err)?;
        self.inner.restart_cute(clamp_count(sample_count), footprint);
        Ok(())
    }

    // Arrays

    /// Flat `[x0, y0, x1, y1, ...]`, founders first.
    fn positions<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f32>> {
        let flat: Vec<f32> = self
            .inner
            .entities()
            .flat_map(|b| [b.position.x, b.position.y])
            .collect();
        flat.to_pyarray(py)
    }

    /// Heading in radians per bug.
    fn headings<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f32>> {
        let headings: Vec<f32> = self.inner.entities().map(|b| b.heading).collect();
        headings.to_pyarray(py)
    }

    /// Scale per bug.
    fn scales<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f32>> {
        let scales: Vec<f32> = self.inner.entities().map(|b| b.scale).collect();
        scales.to_pyarray(py)
    }

    /// Bug ids, aligned with the other arrays.
    fn ids<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<u64>> {
        let ids: Vec<u64> = self.inner.entities().map(|b| b.id().as_u64()).collect();
        ids.to_pyarray(py)
    }

    /// Coalescence times in seconds.
    fn history<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.inner.history().as_slice().to_pyarray(py)
    }

    /// Coalescence times divided by the latest one.
    fn normalized_history<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.inner.history().normalized().to_pyarray(py)
    }

    /// Arena as `(x, y, width, height)`.
    fn arena(&self) -> (f32, f32, f32, f32) {
        let rect = self.inner.arena().rect();
        (rect.origin.x, rect.origin.y, rect.size.x, rect.size.y)
    }

    /// Full state as a JSON string.
    fn snapshot_json(&self) -> PyResult<String> {
        serde_json::to_string(&self.inner.snapshot())
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    // Properties

    #[getter]
    fn population(&self) -> usize {
        self.inner.population()
    }

    #[getter]
    fn lineage_count(&self) -> usize {
        self.inner.lineage_count()
    }

    #[getter]
    fn running(&self) -> bool {
        self.inner.is_running()
    }

    #[getter]
    fn chase_mode(&self) -> bool {
        self.inner.chase_mode()
    }

    #[getter]
    fn procreate_mode(&self) -> bool {
        self.inner.procreate_mode()
    }

    #[getter]
    fn elapsed(&self) -> f64 {
        self.inner.elapsed()
    }

    #[getter]
    fn last_event_time(&self) -> Option<f64> {
        self.inner.last_event_time()
    }

    #[getter]
    fn global_scale(&self) -> f32 {
        self.inner.global_scale()
    }

    #[getter]
    fn merge_threshold(&self) -> Option<f32> {
        self.inner.merge_threshold()
    }

    fn __repr__(&self) -> String {
        format!(
            "Simulation(lineages={}, offspring={}, running={})",
            self.inner.lineage_count(),
            self.inner.offspring().len(),
            self.inner.is_running()
        )
    }
}

/// Python module definition.
#[pymodule]
fn _bugsinbox(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySimulation>()?;
    Ok(())
}
