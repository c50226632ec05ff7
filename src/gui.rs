// src/gui.rs
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread::JoinHandle;
use eframe::egui;
use egui::Color32;
use egui_plot::{Line, Plot, PlotPoints, Points, VLine};
use log::{info, warn};
use neuroscope::acquisition::{spawn_thread, SyntheticChannel, SyntheticSource};
use neuroscope::display::{ScaleUsage, StorageData};
use neuroscope::{
    ChannelSpec, DisplayBufferEngine, DisplaySettings, SampleBlock, SampleFifo, ScaleCategory,
    WindowMode,
};
struct ChannelRow {
    name: String,
    visible: bool,
}
pub struct ScopeApp {
    settings: DisplaySettings,
    engine: DisplayBufferEngine,
    fifo: SampleFifo,
    rows: Vec<ChannelRow>,
    last_usage: ScaleUsage,
    log_messages: Vec<String>,
    // 采集线程
    rx: Receiver<SampleBlock>,
    stop: Arc<AtomicBool>,
    producer: Option<JoinHandle<()>>,
}
impl ScopeApp {
    pub fn new(settings: DisplaySettings, sample_rate_hz: f64, channel_count: usize) -> anyhow::Result<Self> {
        let mut engine = DisplayBufferEngine::new(sample_rate_hz, &settings)?;
        let mut channels = SyntheticSource::demo(sample_rate_hz, channel_count)?.channels().to_vec();
        channels.push(SyntheticChannel {
            event_rate_hz: 20.0,
            ..SyntheticChannel::sine("DIN-00", 0.0, 0.0)
        });
        let block_len = (sample_rate_hz / 60.0).ceil() as usize;
        let source = SyntheticSource::new(sample_rate_hz, block_len, channels, 0x5eed)?;
        let mut rows = Vec::new();
        for ch in source.channels() {
            let spec = if ch.amplitude == 0.0 && ch.event_rate_hz > 0.0 {
                ChannelSpec::raster(ScaleCategory::DigitalIo)
            } else if ch.stim_period_s.is_some() {
                ChannelSpec::stim(ScaleCategory::Wideband)
            } else {
                ChannelSpec::analog(ScaleCategory::Wideband)
            };
            engine.register_channel(&ch.label, spec);
            rows.push(ChannelRow {
                name: ch.label.clone(),
                visible: true,
            });
        }
        let window = engine.geometry().window_samples();
        let fifo = SampleFifo::with_history(source.channel_labels(), window, window);
        let (tx, rx) = channel();
        let stop = Arc::new(AtomicBool::new(false));
        let producer = spawn_thread(source, tx, stop.clone());
        Ok(Self {
            settings,
            engine,
            fifo,
            rows,
            last_usage: ScaleUsage::default(),
            log_messages: vec!["neuroscope ready.".to_owned()],
            rx,
            stop,
            producer: Some(producer),
        })
    }
    fn log(&mut self, msg: &str) {
        info!("{msg}");
        self.log_messages.push(format!("> {}", msg));
        if self.log_messages.len() > 8 {
            self.log_messages.remove(0);
        }
    }
    /// Moves acquired blocks into the FIFO and runs one display frame per complete zone.
    fn pump(&mut self) {
        while let Ok(block) = self.rx.try_recv() {
            if let Err(err) = self.fifo.push_block(&block) {
                warn!("dropping acquisition block: {err}");
            }
        }
        if !self.settings.realtime_active {
            // history keeps moving while the display is frozen
            let pending = self.fifo.pending();
            self.fifo.commit(pending);
            return;
        }
        let spz = self.engine.samples_per_zone();
        while self.fifo.pending() >= spz {
            self.fifo.commit(spz);
            self.engine.begin_frame(self.settings.window_mode);
            for row in self.rows.iter().filter(|r| r.visible) {
                self.engine.load_live_data(&row.name, &self.fifo);
            }
            self.last_usage = self.engine.end_frame();
        }
    }
    fn channel_plot(&self, ui: &mut egui::Ui, name: &str, color: Color32) {
        let Some(store) = self.engine.store(name) else {
            return;
        };
        let scale = self.settings.scales.value(store.scale()) as f64;
        let (low, high) = if store.scale() == ScaleCategory::DigitalIo {
            (0.0, scale)
        } else {
            (-scale, scale)
        };
        let caption = if store.is_out_of_date() {
            format!("{name} (stale)")
        } else {
            name.to_owned()
        };
        ui.label(egui::RichText::new(caption).color(if store.is_out_of_date() {
            Color32::GRAY
        } else {
            color
        }));
        let engine = &self.engine;
        Plot::new(format!("plot-{name}"))
            .height(90.0)
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .show_axes([false, true])
            .include_x(0.0)
            .include_x(engine.width_pixels() as f64)
            .include_y(low)
            .include_y(high)
            .show(ui, |plot_ui| {
                // each segment separately so the sweep cursor gap is not bridged
                for segment in engine.segments() {
                    match store.data() {
                        StorageData::Raw(_) => {
                            let points: Vec<[f64; 2]> = store
                                .points(engine.geometry(), segment.clone())
                                .map(|(x, v)| [x as f64, v as f64])
                                .collect();
                            plot_ui.line(Line::new(PlotPoints::new(points)).color(color));
                        }
                        StorageData::Envelope(cells) => {
                            let mut points = Vec::with_capacity(segment.len() * 2);
                            for i in segment.clone() {
                                let x = engine.unit_x(i) as f64;
                                points.push([x, cells[i].min as f64]);
                                points.push([x, cells[i].max as f64]);
                            }
                            plot_ui.line(Line::new(PlotPoints::new(points)).color(color));
                        }
                        StorageData::Raster(ticks) => {
                            let points: Vec<[f64; 2]> = segment
                                .clone()
                                .filter(|i| ticks[*i])
                                .map(|i| [engine.unit_x(i) as f64, high * 0.5])
                                .collect();
                            plot_ui.points(Points::new(PlotPoints::new(points)).radius(2.0).color(color));
                        }
                    }
                    if let Some(flags) = store.stim_flags() {
                        let marks: Vec<[f64; 2]> = segment
                            .clone()
                            .filter(|i| flags[*i] != 0)
                            .map(|i| [engine.unit_x(i) as f64, high * 0.9])
                            .collect();
                        plot_ui.points(Points::new(PlotPoints::new(marks)).radius(1.5).color(Color32::RED));
                    }
                }
                if engine.window_mode() == WindowMode::Sweep && engine.old_data_present() {
                    plot_ui.vline(VLine::new(engine.refresh_x_position() as f64).color(Color32::DARK_GRAY));
                }
            });
    }
}
impl eframe::App for ScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.pump();
        ctx.request_repaint();
        let mut visuals = egui::Visuals::dark();
        visuals.widgets.noninteractive.bg_fill = Color32::from_rgb(10, 10, 15);
        ctx.set_visuals(visuals);
        egui::SidePanel::left("L").min_width(240.0).show(ctx, |ui| {
            ui.add_space(10.0);
            ui.heading("neuroscope");
            ui.label("Zone-refreshed display");
            ui.separator();
            let before = self.settings.window_mode;
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.settings.window_mode, WindowMode::Roll, "ROLL");
                ui.selectable_value(&mut self.settings.window_mode, WindowMode::Sweep, "SWEEP");
            });
            if before != self.settings.window_mode {
                self.log(&format!("window mode: {:?}", self.settings.window_mode));
            }
            let run_txt = if self.settings.realtime_active { "FREEZE" } else { "RESUME" };
            if ui.button(run_txt).clicked() {
                self.settings.realtime_active = !self.settings.realtime_active;
                if self.settings.realtime_active {
                    // frozen stretch is not stitched onto the live trace
                    self.engine.reset_all();
                    self.log("display resumed");
                } else {
                    self.log("display frozen");
                }
            }
            if ui.button("RESET VIEW").clicked() {
                self.engine.reset_all();
                self.log("view reset");
            }
            ui.separator();
            ui.label("CHANNELS");
            for row in &mut self.rows {
                ui.checkbox(&mut row.visible, row.name.as_str());
            }
            ui.separator();
            let g = *self.engine.geometry();
            ui.monospace(format!(
                "{} px, {} zones\n{} samples/zone\n{} storage",
                g.width_pixels,
                g.num_refresh_zones,
                g.samples_per_zone,
                if g.use_envelope_mode { "envelope" } else { "direct" }
            ));
            for (category, value) in self.last_usage.with_values(&self.settings.scales) {
                ui.monospace(format!("{category:?}: ±{value}"));
            }
            ui.add_space(10.0);
            egui::ScrollArea::vertical().max_height(120.0).show(ui, |ui| {
                for m in &self.log_messages {
                    ui.monospace(m);
                }
            });
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            let colors = [
                Color32::from_rgb(0x5b, 0x8f, 0xff),
                Color32::from_rgb(0xff, 0x8c, 0x42),
                Color32::from_rgb(0x54, 0xc7, 0x6b),
                Color32::from_rgb(0xd1, 0x5b, 0xff),
            ];
            egui::ScrollArea::vertical().show(ui, |ui| {
                for (i, row) in self.rows.iter().enumerate().filter(|(_, r)| r.visible) {
                    self.channel_plot(ui, &row.name, colors[i % colors.len()]);
                }
            });
        });
    }
}
impl Drop for ScopeApp {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.producer.take() {
            if handle.join().is_err() {
                warn!("acquisition thread panicked");
            }
        }
    }
}
