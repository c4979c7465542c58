//! Standalone Inspector window for development and testing.
//!
//! Shows the inspector for a demo graph. A background thread periodically
//! raises the busy broadcast so the spinner affordance can be eyeballed.

use std::thread;
use std::time::Duration;

use eframe::egui;
use noda::graph::{force_dirty, GraphNotice};
use noda::shell;
use noda::widgets::inspector::{Inspector, InspectorState};
use noda::{Graph, NodeRef, NotifyHub, Subscription};

fn main() -> eframe::Result<()> {
    shell::init_logger();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([420.0, 380.0])
            .with_title("Noda - Inspector"),
        ..Default::default()
    };

    eframe::run_native(
        "noda-inspector",
        options,
        Box::new(|_cc| Ok(Box::new(InspectorApp::new()))),
    )
}

/// Simulates the editor's long-running background computation.
fn spawn_busy_simulator(hub: NotifyHub) {
    thread::Builder::new()
        .name("noda-busy-sim".into())
        .spawn(move || loop {
            thread::sleep(Duration::from_secs(6));
            hub.emit(GraphNotice::ExternalThreadActive(true));
            thread::sleep(Duration::from_millis(1500));
            hub.emit(GraphNotice::ExternalThreadActive(false));
        })
        .expect("failed to spawn busy simulator");
}

struct InspectorApp {
    graph: Graph,
    selected: NodeRef,
    inspector: Inspector,
    state: InspectorState,
    error_msg: Option<String>,
    _notice_log: Subscription,
}

impl InspectorApp {
    fn new() -> Self {
        let (graph, sphere) = shell::demo_graph().expect("demo graph construction failed");
        spawn_busy_simulator(graph.hub().clone());
        let inspector = Inspector::for_node(&sphere, graph.hub());
        let _notice_log = graph.hub().watch(|n| log::trace!("notice: {:?}", n));

        Self {
            graph,
            selected: sphere,
            inspector,
            state: InspectorState::default(),
            error_msg: None,
            _notice_log,
        }
    }

    fn select(&mut self, node: NodeRef) {
        self.inspector = Inspector::for_node(&node, self.graph.hub());
        self.selected = node;
    }
}

impl eframe::App for InspectorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Error panel
        if self.error_msg.is_some() {
            egui::TopBottomPanel::top("error_panel").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.colored_label(egui::Color32::RED, self.error_msg.as_ref().unwrap());
                    if ui.button("X").clicked() {
                        self.error_msg = None;
                    }
                });
            });
        }

        // Node selector panel
        egui::TopBottomPanel::top("node_selector").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Select node:");
                let nodes: Vec<NodeRef> = self.graph.nodes().cloned().collect();
                let selected_uuid = self.selected.read().expect("node lock poisoned").uuid();
                for node in nodes {
                    let (uuid, name) = {
                        let n = node.read().expect("node lock poisoned");
                        (n.uuid(), n.name().to_string())
                    };
                    if ui.selectable_label(uuid == selected_uuid, name).clicked() {
                        self.select(node);
                    }
                }

                ui.separator();
                if ui.button("Nudge radius").clicked() {
                    // External model edit: fields must pick it up without
                    // a user interaction
                    if let Some(sphere) = self.graph.node_by_name("sphere1") {
                        if let Some(radius) =
                            sphere.read().expect("node lock poisoned").attribute("radius")
                        {
                            {
                                let mut r = radius.write().expect("attribute lock poisoned");
                                let current = r.value().as_float().unwrap_or_default();
                                r.set_out_float(current + 1.0);
                            }
                            force_dirty(&radius);
                        }
                    }
                }
            });
        });

        // Status panel
        egui::TopBottomPanel::bottom("status_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let n = self.selected.read().expect("node lock poisoned");
                ui.label(format!("Node: {}", n.name()));
                ui.separator();
                ui.label(format!("UUID: {:.8}", n.uuid()));
                ui.separator();
                ui.label(format!("Attrs: {}", n.attribute_count()));
            });
        });

        // Main inspector panel
        egui::CentralPanel::default().show(ctx, |ui| {
            self.inspector.ui(ui, &mut self.state);
        });

        // Keep polling subscriptions and the spinner animation alive
        ctx.request_repaint_after(Duration::from_millis(200));
    }
}
