// SPDX-License-Identifier: MPL-2.0

//! Rotating display surface using the Wayland layer-shell protocol.
//! This bypasses the compositor's window management to achieve borderless
//! rendering; dragging and full-screen are handled by hand for the same
//! reason.

use super::fade::PanelRotation;
use super::glow::render_frame;
use super::panel::{Panel, WeatherSnapshot};
use crate::api;
use crate::locale::LocalizationEntry;
use crate::settings::Settings;
use std::os::fd::{AsRawFd, RawFd};
use std::time::{Duration, Instant};

use smithay_client_toolkit::{
    compositor::{CompositorHandler, CompositorState},
    delegate_compositor, delegate_keyboard, delegate_layer, delegate_output, delegate_pointer,
    delegate_registry, delegate_seat, delegate_shm,
    output::{OutputHandler, OutputState},
    registry::{ProvidesRegistryState, RegistryState},
    registry_handlers,
    seat::{
        keyboard::{KeyEvent, KeyboardHandler, Keysym, Modifiers},
        pointer::{PointerEvent, PointerEventKind, PointerHandler},
        Capability, SeatHandler, SeatState,
    },
    shell::{
        wlr_layer::{
            Anchor, KeyboardInteractivity, Layer, LayerShell, LayerShellHandler, LayerSurface,
            LayerSurfaceConfigure,
        },
        WaylandSurface,
    },
    shm::{slot::SlotPool, Shm, ShmHandler},
};
use wayland_client::{
    globals::registry_queue_init,
    protocol::{wl_keyboard, wl_output, wl_seat, wl_shm, wl_surface},
    Connection, QueueHandle,
};

const WINDOW_WIDTH: u32 = 1000;
const WINDOW_HEIGHT: u32 = 700;

/// Initial surface position, as layer margins from the top-left corner.
const INITIAL_MARGIN_X: i32 = 50;
const INITIAL_MARGIN_Y: i32 = 50;

/// Period between weather refreshes.
const FETCH_PERIOD: Duration = Duration::from_secs(600);
/// Period between clock updates.
const CLOCK_PERIOD: Duration = Duration::from_secs(1);
/// Period between panel rotations.
const ROTATION_PERIOD: Duration = Duration::from_secs(10);
/// Socket poll timeout per frame, ~60 FPS responsiveness.
const FRAME_POLL: Duration = Duration::from_millis(16);

const BTN_LEFT: u32 = 0x110;

/// Wait up to `timeout` for the descriptor to become readable.
fn poll_readable(fd: RawFd, timeout: Duration) -> bool {
    let mut pollfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    let timeout_ms = timeout.as_millis() as libc::c_int;
    let ready = unsafe { libc::poll(&mut pollfd, 1, timeout_ms) };
    ready > 0 && (pollfd.revents & libc::POLLIN) != 0
}

struct DisplayWindow {
    registry_state: RegistryState,
    output_state: OutputState,
    compositor_state: CompositorState,
    shm_state: Shm,
    layer_shell: LayerShell,
    seat_state: SeatState,

    /// The main surface for rendering
    layer_surface: Option<LayerSurface>,

    /// Memory pool for rendering
    pool: Option<SlotPool>,

    /// Current surface size (updated by configure events)
    width: u32,
    height: u32,

    /// Confirmed city and the labels for the selected language
    city: String,
    entry: &'static LocalizationEntry,

    /// Latest successfully fetched weather, placeholder until then
    snapshot: WeatherSnapshot,
    /// Current wall-clock text, HH:MM:SS
    clock_text: String,
    /// Active panel and cross-fade state
    rotation: PanelRotation,

    /// Timer bookkeeping for the three cycles
    last_fetch: Instant,
    last_clock: Instant,
    last_rotation: Instant,
    last_frame: Instant,

    /// Mouse dragging state
    dragging: bool,
    drag_start_x: f64,
    drag_start_y: f64,
    margin_x: i32,
    margin_y: i32,

    /// Full-screen toggle state (F11)
    fullscreen: bool,

    needs_redraw: bool,
    exit: bool,
}

impl DisplayWindow {
    fn new(
        globals: &wayland_client::globals::GlobalList,
        qh: &QueueHandle<Self>,
        settings: &Settings,
    ) -> Self {
        let registry_state = RegistryState::new(globals);
        let output_state = OutputState::new(globals, qh);
        let compositor_state =
            CompositorState::bind(globals, qh).expect("wl_compositor not available");
        let shm_state = Shm::bind(globals, qh).expect("wl_shm not available");
        let layer_shell = LayerShell::bind(globals, qh).expect("layer shell not available");
        let seat_state = SeatState::new(globals, qh);

        let now = Instant::now();

        Self {
            registry_state,
            output_state,
            compositor_state,
            shm_state,
            layer_shell,
            seat_state,
            layer_surface: None,
            pool: None,
            width: WINDOW_WIDTH,
            height: WINDOW_HEIGHT,
            city: settings.city.clone(),
            entry: settings.language.localization(),
            snapshot: WeatherSnapshot::default(),
            clock_text: String::new(),
            rotation: PanelRotation::default(),
            last_fetch: now,
            last_clock: now,
            last_rotation: now,
            last_frame: now,
            dragging: false,
            drag_start_x: 0.0,
            drag_start_y: 0.0,
            margin_x: INITIAL_MARGIN_X,
            margin_y: INITIAL_MARGIN_Y,
            fullscreen: false,
            needs_redraw: true,
            exit: false,
        }
    }

    fn create_layer_surface(&mut self, qh: &QueueHandle<Self>) {
        let surface = self.compositor_state.create_surface(qh);

        let layer_surface = self.layer_shell.create_layer_surface(
            qh,
            surface,
            Layer::Top,
            Some("neon-weather"),
            None,
        );

        layer_surface.set_anchor(Anchor::TOP | Anchor::LEFT);
        layer_surface.set_size(WINDOW_WIDTH, WINDOW_HEIGHT);
        layer_surface.set_exclusive_zone(-1); // Don't reserve space
        layer_surface.set_margin(self.margin_y, 0, 0, self.margin_x);
        // Keyboard focus on click, for Escape and F11
        layer_surface.set_keyboard_interactivity(KeyboardInteractivity::OnDemand);

        layer_surface.commit();

        self.layer_surface = Some(layer_surface);
    }

    /// Blocking weather refresh on the UI thread. The request timeout keeps
    /// the stall short, and a failed refresh is explicitly dropped so the
    /// previous snapshot (or the initial placeholder) stays visible.
    fn refresh_weather(&mut self) {
        log::info!("Fetching weather for {}", self.city);
        let result = api::fetch_current(&self.city, self.entry.service_code);
        match &result {
            Ok(report) => {
                self.needs_redraw = true;
                log::info!("Weather updated: {} / {}", report.temperature, report.description);
            }
            Err(err) => {
                log::debug!("Weather refresh failed, keeping previous snapshot: {err}");
            }
        }
        self.snapshot = self.snapshot.clone().apply(result);
    }

    fn update_clock(&mut self) {
        self.clock_text = chrono::Local::now().format("%H:%M:%S").to_string();
        self.needs_redraw = true;
    }

    fn toggle_fullscreen(&mut self) {
        let output_size = self.output_size();
        let Some(layer_surface) = &self.layer_surface else {
            return;
        };
        if self.fullscreen {
            layer_surface.set_size(WINDOW_WIDTH, WINDOW_HEIGHT);
            layer_surface.set_margin(self.margin_y, 0, 0, self.margin_x);
        } else {
            let (width, height) = output_size;
            log::debug!("Entering full-screen at {}x{}", width, height);
            layer_surface.set_margin(0, 0, 0, 0);
            layer_surface.set_size(width, height);
        }
        layer_surface.commit();
        self.fullscreen = !self.fullscreen;
    }

    /// Logical size of the first output, falling back to the windowed size
    /// when the compositor hasn't told us yet.
    fn output_size(&self) -> (u32, u32) {
        self.output_state
            .outputs()
            .next()
            .and_then(|output| self.output_state.info(&output))
            .and_then(|info| info.logical_size)
            .map(|(width, height)| (width.max(1) as u32, height.max(1) as u32))
            .unwrap_or((WINDOW_WIDTH, WINDOW_HEIGHT))
    }

    /// Text and style of the panel being rendered this frame.
    fn active_panel_text(&self) -> String {
        match self.rotation.active() {
            Panel::Temperature => self.snapshot.temperature_text(),
            Panel::Clock => self.clock_text.clone(),
            Panel::Details => {
                // Blank until the first successful fetch
                if self.snapshot == WeatherSnapshot::default() {
                    String::new()
                } else {
                    self.snapshot.details_text(self.entry)
                }
            }
        }
    }

    fn draw(&mut self) {
        let layer_surface = match &self.layer_surface {
            Some(ls) => ls.clone(),
            None => {
                log::warn!("No layer surface available for drawing");
                return;
            }
        };

        let width = self.width as i32;
        let height = self.height as i32;
        let stride = width * 4;

        if self.pool.is_none() {
            self.pool = Some(
                SlotPool::new(width as usize * height as usize * 4, &self.shm_state)
                    .expect("Failed to create pool"),
            );
        }
        let panel = self.rotation.active();
        let text = self.active_panel_text();

        let pool = self.pool.as_mut().unwrap();

        let (buffer, canvas) = pool
            .create_buffer(width, height, stride, wl_shm::Format::Argb8888)
            .expect("Failed to create buffer");

        render_frame(
            canvas,
            width,
            height,
            &text,
            panel.color(),
            panel.font_divisor(),
            self.rotation.opacity(),
        );

        layer_surface
            .wl_surface()
            .attach(Some(buffer.wl_buffer()), 0, 0);
        layer_surface.wl_surface().damage_buffer(0, 0, width, height);
        layer_surface.wl_surface().commit();
    }
}

impl CompositorHandler for DisplayWindow {
    fn scale_factor_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _new_factor: i32,
    ) {
    }

    fn transform_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _new_transform: wl_output::Transform,
    ) {
    }

    fn frame(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _time: u32,
    ) {
        self.needs_redraw = true;
    }

    fn surface_enter(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _output: &wl_output::WlOutput,
    ) {
    }

    fn surface_leave(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _output: &wl_output::WlOutput,
    ) {
    }
}

impl OutputHandler for DisplayWindow {
    fn output_state(&mut self) -> &mut OutputState {
        &mut self.output_state
    }

    fn new_output(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
    }

    fn update_output(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
    }

    fn output_destroyed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
    }
}

impl LayerShellHandler for DisplayWindow {
    fn closed(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _layer: &LayerSurface) {
        self.exit = true;
    }

    fn configure(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _layer: &LayerSurface,
        configure: LayerSurfaceConfigure,
        _serial: u32,
    ) {
        let (width, height) = configure.new_size;
        if width != 0 && height != 0 && (width != self.width || height != self.height) {
            log::debug!("Surface resized to {}x{}", width, height);
            self.width = width;
            self.height = height;
            // Recreate the pool at the new size on the next draw
            self.pool = None;
        }
        self.draw();
    }
}

impl SeatHandler for DisplayWindow {
    fn seat_state(&mut self) -> &mut SeatState {
        &mut self.seat_state
    }

    fn new_seat(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _seat: wl_seat::WlSeat) {}

    fn new_capability(
        &mut self,
        _conn: &Connection,
        qh: &QueueHandle<Self>,
        seat: wl_seat::WlSeat,
        capability: Capability,
    ) {
        if capability == Capability::Pointer {
            let _ = self.seat_state.get_pointer(qh, &seat);
        }
        if capability == Capability::Keyboard {
            let _ = self.seat_state.get_keyboard(qh, &seat, None);
        }
    }

    fn remove_capability(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _seat: wl_seat::WlSeat,
        _capability: Capability,
    ) {
    }

    fn remove_seat(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _seat: wl_seat::WlSeat) {
    }
}

impl PointerHandler for DisplayWindow {
    fn pointer_frame(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _pointer: &wayland_client::protocol::wl_pointer::WlPointer,
        events: &[PointerEvent],
    ) {
        for event in events {
            match event.kind {
                // Left press starts a drag; there is no title bar to grab
                PointerEventKind::Press { button, .. } if button == BTN_LEFT => {
                    self.dragging = true;
                    self.drag_start_x = event.position.0;
                    self.drag_start_y = event.position.1;
                }
                PointerEventKind::Release { button, .. } if button == BTN_LEFT => {
                    self.dragging = false;
                }
                PointerEventKind::Motion { .. } if self.dragging && !self.fullscreen => {
                    let delta_x = (event.position.0 - self.drag_start_x) as i32;
                    let delta_y = (event.position.1 - self.drag_start_y) as i32;

                    // No bounds clamping: the surface may be dragged off-screen
                    self.margin_x += delta_x;
                    self.margin_y += delta_y;

                    if let Some(layer_surface) = &self.layer_surface {
                        layer_surface.set_margin(self.margin_y, 0, 0, self.margin_x);
                        layer_surface.commit();
                    }
                }
                _ => {}
            }
        }
    }
}

impl KeyboardHandler for DisplayWindow {
    fn enter(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _surface: &wl_surface::WlSurface,
        _serial: u32,
        _raw: &[u32],
        _keysyms: &[Keysym],
    ) {
    }

    fn leave(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _surface: &wl_surface::WlSurface,
        _serial: u32,
    ) {
    }

    fn press_key(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _serial: u32,
        event: KeyEvent,
    ) {
        match event.keysym {
            Keysym::Escape => {
                log::info!("Escape pressed, closing display");
                self.exit = true;
            }
            Keysym::F11 => self.toggle_fullscreen(),
            _ => {}
        }
    }

    fn release_key(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _serial: u32,
        _event: KeyEvent,
    ) {
    }

    fn update_modifiers(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _serial: u32,
        _modifiers: Modifiers,
        _layout: u32,
    ) {
    }
}

impl ShmHandler for DisplayWindow {
    fn shm_state(&mut self) -> &mut Shm {
        &mut self.shm_state
    }
}

delegate_compositor!(DisplayWindow);
delegate_output!(DisplayWindow);
delegate_shm!(DisplayWindow);
delegate_seat!(DisplayWindow);
delegate_pointer!(DisplayWindow);
delegate_keyboard!(DisplayWindow);
delegate_layer!(DisplayWindow);

delegate_registry!(DisplayWindow);

impl ProvidesRegistryState for DisplayWindow {
    fn registry(&mut self) -> &mut RegistryState {
        &mut self.registry_state
    }
    registry_handlers![OutputState, SeatState];
}

/// Run the rotating display until the window is closed.
///
/// Performs an initial blocking fetch, then drives the three cycles (fetch,
/// clock, rotation) plus the fade animation from a single cooperative loop.
/// The timers are independent and unsynchronized; everything runs on this
/// one thread, so no effect interleaves within a tick.
pub fn run(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    log::info!(
        "Starting display for {} ({})",
        settings.city,
        settings.language.label()
    );

    let conn = Connection::connect_to_env()?;
    let (globals, mut event_queue) = registry_queue_init(&conn)?;
    let qh = event_queue.handle();

    let mut window = DisplayWindow::new(&globals, &qh, settings);
    window.create_layer_surface(&qh);

    // Wait for the compositor's first configure before drawing
    event_queue.roundtrip(&mut window)?;

    window.update_clock();
    window.refresh_weather();

    loop {
        // Flush our requests, then wait up to one frame for socket traffic
        // before dispatching; dispatch_pending alone never reads the socket.
        conn.flush()?;
        if let Some(guard) = event_queue.prepare_read() {
            if poll_readable(guard.connection_fd().as_raw_fd(), FRAME_POLL) {
                guard.read()?;
            }
            // An unread guard cancels the read on drop
        }
        event_queue.dispatch_pending(&mut window)?;

        let now = Instant::now();
        let frame_elapsed = now.duration_since(window.last_frame);
        window.last_frame = now;

        if now.duration_since(window.last_fetch) >= FETCH_PERIOD {
            window.last_fetch = now;
            window.refresh_weather();
        }

        if now.duration_since(window.last_clock) >= CLOCK_PERIOD {
            window.last_clock = now;
            window.update_clock();
        }

        if now.duration_since(window.last_rotation) >= ROTATION_PERIOD {
            window.last_rotation = now;
            window.rotation.begin_fade();
        }

        if window.rotation.animating() {
            window.rotation.tick(frame_elapsed);
            window.needs_redraw = true;
        }

        if window.needs_redraw {
            window.draw();
            window.needs_redraw = false;
        }

        conn.flush()?;

        if window.exit {
            log::info!("Exit requested, shutting down");
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::os::unix::net::UnixStream;

    #[test]
    fn test_poll_readable_sees_pending_data() {
        let (mut tx, rx) = UnixStream::pair().unwrap();
        tx.write_all(&[1]).unwrap();
        assert!(poll_readable(rx.as_raw_fd(), Duration::from_millis(100)));
    }

    #[test]
    fn test_poll_readable_times_out_on_idle_socket() {
        let (_tx, rx) = UnixStream::pair().unwrap();
        assert!(!poll_readable(rx.as_raw_fd(), Duration::from_millis(10)));
    }
}
