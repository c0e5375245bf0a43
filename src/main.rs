//! band-terminal: terminal-styled site for a music project.
//!
//! A GPU-rendered fullscreen window that draws a pseudo command line with a
//! handful of views (main, links and player, gigs, about).
//!
//! Uses vello/wgpu for rendering and tokio + reqwest to check player embeds.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use vello::peniko::color::palette;
use vello::util::{RenderContext, RenderSurface};
use vello::{AaConfig, Renderer, RendererOptions, Scene};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key, ModifiersState};
use winit::window::{Fullscreen, Window};

use vello::wgpu;

use band_terminal::config::SiteConfig;
use band_terminal::embed::{EmbedProbe, HttpProbe, ScriptedProbe};
use band_terminal::mount::MountedTerminal;
use band_terminal::opener::{Opener, RecordingOpener, SystemOpener};
use band_terminal::panels::{self, LineStyle};
use band_terminal::render::{self, Hit, TerminalRenderer};
use band_terminal::shortcuts::{KeyPress, KeyboardHub, Propagation};
use band_terminal::terminal::Terminal;
use band_terminal::logging;

/// Terminal-styled site for a music project
#[derive(Parser, Debug)]
#[command(name = "band-terminal", version, about = "Terminal-styled band site")]
struct Args {
    /// Path to site.toml (defaults to the config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start in windowed mode instead of fullscreen
    #[arg(short, long)]
    windowed: bool,

    /// Override the artificial command latency in milliseconds
    #[arg(long)]
    latency_ms: Option<u64>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    dump_config: bool,

    /// Record links instead of launching the browser or mail client
    #[arg(long)]
    no_launch: bool,

    /// Treat every player embed as unreachable
    #[arg(long)]
    offline: bool,

    /// Debug-level logging for band-terminal
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug)]
enum RenderState {
    Active {
        surface: Box<RenderSurface<'static>>,
        valid_surface: bool,
        window: Arc<Window>,
    },
    Suspended(Option<Arc<Window>>),
}

struct App {
    context: RenderContext,
    renderers: Vec<Option<Renderer>>,
    state: RenderState,
    scene: Scene,
    windowed: bool,
    hub: KeyboardHub,
    mounted: Option<MountedTerminal>,
    painter: TerminalRenderer,
    modifiers: ModifiersState,
    pointer: (f64, f64),
    surface_size: (f64, f64),
    clipboard: Option<arboard::Clipboard>,
}

impl App {
    fn on_key(&mut self, key: &Key, event_loop: &ActiveEventLoop) {
        let press = KeyPress {
            key,
            modifiers: self.modifiers,
        };
        if self.hub.dispatch(&press) == Propagation::Consumed {
            return;
        }

        let command_key = self.modifiers.control_key() || self.modifiers.super_key();
        let Some(mounted) = &self.mounted else {
            return;
        };

        match key {
            Key::Character(c) if command_key && c.eq_ignore_ascii_case("q") => event_loop.exit(),
            Key::Character(c) if command_key && c.eq_ignore_ascii_case("v") => {
                let text = self.clipboard.as_mut().and_then(|cb| cb.get_text().ok());
                if let Some(text) = text {
                    mounted.terminal_mut().paste(&text);
                }
            }
            _ => mounted
                .terminal_mut()
                .handle_key(key, self.modifiers, Instant::now()),
        }
    }

    fn on_click(&mut self) {
        let Some(mounted) = &self.mounted else {
            return;
        };
        let (width, height) = self.surface_size;
        let (x, y) = self.pointer;

        let mut terminal = mounted.terminal_mut();
        let lines = panels::panel_lines(&terminal, today());
        let layout = self.painter.layout(width, height, lines.len());
        match layout.hit_test(x, y) {
            Hit::Input => terminal.set_focused(true),
            Hit::PanelLine(idx) => {
                terminal.set_focused(false);
                let style = lines.get(idx).map(|line| line.style.clone());
                match style {
                    Some(LineStyle::FallbackLink) => terminal.open_fallback(),
                    Some(LineStyle::RetryButton) => {
                        terminal.retry_player();
                    }
                    _ => {}
                }
            }
            Hit::Header | Hit::Output | Hit::Outside => terminal.set_focused(false),
        }
    }

    fn on_scroll(&mut self, delta: MouseScrollDelta) {
        let Some(mounted) = &self.mounted else {
            return;
        };
        let line_h = self.painter.line_height();
        let lines = match delta {
            MouseScrollDelta::LineDelta(_, y) => (y * 3.0) as f64,
            MouseScrollDelta::PixelDelta(pos) => pos.y / line_h,
        };
        let mut terminal = mounted.terminal_mut();
        if lines > 0.0 {
            terminal.scroll_up(lines.round() as usize);
        } else if lines < 0.0 {
            terminal.scroll_down((-lines).round() as usize);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let RenderState::Suspended(cached_window) = &mut self.state else {
            return;
        };

        let window = match cached_window.take() {
            Some(window) => window,
            None => match create_window(event_loop, self.windowed) {
                Ok(window) => window,
                Err(e) => {
                    error!("{e:#}");
                    event_loop.exit();
                    return;
                }
            },
        };

        let size = window.inner_size();
        let surface_future = self.context.create_surface(
            window.clone(),
            size.width,
            size.height,
            wgpu::PresentMode::AutoVsync,
        );
        let surface = match pollster::block_on(surface_future) {
            Ok(surface) => surface,
            Err(e) => {
                error!("Error creating surface: {e}");
                event_loop.exit();
                return;
            }
        };

        self.renderers.resize_with(self.context.devices.len(), || None);
        if self.renderers[surface.dev_id].is_none() {
            match create_renderer(&self.context, &surface) {
                Ok(renderer) => self.renderers[surface.dev_id] = Some(renderer),
                Err(e) => {
                    error!("{e:#}");
                    event_loop.exit();
                    return;
                }
            }
        }

        self.surface_size = (size.width as f64, size.height as f64);
        self.state = RenderState::Active {
            surface: Box::new(surface),
            valid_surface: true,
            window,
        };
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        if let RenderState::Active { window, .. } = &self.state {
            self.state = RenderState::Suspended(Some(window.clone()));
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let window = match &self.state {
            RenderState::Active { window, .. } if window.id() == window_id => window.clone(),
            _ => return,
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::ModifiersChanged(modifiers) => self.modifiers = modifiers.state(),

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        ref logical_key,
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => self.on_key(logical_key, event_loop),

            WindowEvent::Focused(focused) => {
                if let Some(mounted) = &self.mounted {
                    mounted.terminal_mut().set_focused(focused);
                }
            }

            WindowEvent::CursorMoved { position, .. } => self.pointer = (position.x, position.y),

            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => self.on_click(),

            WindowEvent::MouseWheel { delta, .. } => self.on_scroll(delta),

            WindowEvent::Resized(size) => {
                if let RenderState::Active { surface, valid_surface, .. } = &mut self.state {
                    if size.width != 0 && size.height != 0 {
                        self.context.resize_surface(surface, size.width, size.height);
                        *valid_surface = true;
                    } else {
                        *valid_surface = false;
                    }
                }
                self.surface_size = (size.width as f64, size.height as f64);
            }

            WindowEvent::RedrawRequested => {
                self.redraw();
                // Request another frame for cursor blink and queued output.
                window.request_redraw();
            }

            _ => {}
        }
    }
}

impl App {
    fn redraw(&mut self) {
        let RenderState::Active { surface, valid_surface, .. } = &mut self.state else {
            return;
        };
        if !*valid_surface {
            return;
        }
        let Some(mounted) = &self.mounted else {
            return;
        };

        mounted.terminal_mut().poll(Instant::now());

        self.scene.reset();
        let width = surface.config.width as f64;
        let height = surface.config.height as f64;
        self.painter
            .render(&mut self.scene, width, height, &mounted.terminal(), today());

        let device_handle = &self.context.devices[surface.dev_id];
        let Some(renderer) = self.renderers[surface.dev_id].as_mut() else {
            return;
        };
        if let Err(e) = renderer.render_to_texture(
            &device_handle.device,
            &device_handle.queue,
            &self.scene,
            &surface.target_view,
            &vello::RenderParams {
                base_color: palette::css::BLACK,
                width: surface.config.width,
                height: surface.config.height,
                antialiasing_method: AaConfig::Msaa16,
            },
        ) {
            warn!("Render failed: {e}");
            return;
        }

        let surface_texture = match surface.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(e) => {
                warn!("Failed to get surface texture: {e}");
                return;
            }
        };

        let mut encoder = device_handle
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Surface Blit"),
            });
        surface.blitter.copy(
            &device_handle.device,
            &mut encoder,
            &surface.target_view,
            &surface_texture
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default()),
        );
        device_handle.queue.submit([encoder.finish()]);
        surface_texture.present();
        let _ = device_handle.device.poll(wgpu::PollType::Poll);
    }
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = logging::init(args.verbose);

    let mut config = SiteConfig::load_startup(args.config.as_deref());
    if let Some(latency_ms) = args.latency_ms {
        config.terminal.latency_ms = latency_ms;
    }

    if args.dump_config {
        print!("{}", config.to_toml());
        return Ok(());
    }

    info!("band-terminal v{}", env!("CARGO_PKG_VERSION"));

    // Runtime for the embed probe
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .context("creating tokio runtime")?;

    let probe: Box<dyn EmbedProbe> = if args.offline {
        Box::new(ScriptedProbe::offline())
    } else {
        Box::new(HttpProbe::new(runtime.handle().clone(), config.probe_timeout())?)
    };
    let opener: Box<dyn Opener> = if args.no_launch {
        Box::new(RecordingOpener::new())
    } else {
        Box::new(SystemOpener)
    };

    let mono_font = render::load_mono_font();
    if mono_font.is_none() {
        warn!("No monospace font found (Menlo/Monaco/DejaVu Sans Mono); using block glyphs.");
    }
    let painter = TerminalRenderer::new(mono_font, config.terminal.font_size, config.terminal.cursor_blink_ms);

    let clipboard = match arboard::Clipboard::new() {
        Ok(cb) => Some(cb),
        Err(e) => {
            warn!("Clipboard unavailable: {e}");
            None
        }
    };

    let hub = KeyboardHub::new();
    let mounted = MountedTerminal::mount(&hub, Terminal::new(config, opener, probe));

    let mut app = App {
        context: RenderContext::new(),
        renderers: vec![],
        state: RenderState::Suspended(None),
        scene: Scene::new(),
        windowed: args.windowed,
        hub,
        mounted: Some(mounted),
        painter,
        modifiers: ModifiersState::empty(),
        pointer: (0.0, 0.0),
        surface_size: (0.0, 0.0),
        clipboard,
    };

    let event_loop = EventLoop::new().context("creating event loop")?;
    event_loop.run_app(&mut app).context("running event loop")?;

    // Unmount before the runtime goes away.
    app.mounted = None;
    runtime.shutdown_timeout(std::time::Duration::from_secs(1));

    Ok(())
}

fn create_window(event_loop: &ActiveEventLoop, windowed: bool) -> Result<Arc<Window>> {
    let mut attr = Window::default_attributes().with_title("band-terminal");

    if !windowed {
        attr = attr.with_fullscreen(Some(Fullscreen::Borderless(None)));
    } else {
        attr = attr.with_inner_size(winit::dpi::LogicalSize::new(1280, 800));
    }

    let window = event_loop.create_window(attr).context("creating window")?;
    Ok(Arc::new(window))
}

fn create_renderer(render_cx: &RenderContext, surface: &RenderSurface<'_>) -> Result<Renderer> {
    Renderer::new(
        &render_cx.devices[surface.dev_id].device,
        RendererOptions::default(),
    )
    .map_err(|e| anyhow::anyhow!("creating renderer: {e}"))
}
