use std::sync::Arc;
use std::time::Duration;

use eframe::egui::{self, Color32, Rounding, Stroke};
use jet_core::{
    CacheReader, ColorModel, InitHandle, MainViewModel, PostModel, PostType, Snapshot, ToggleWatch,
    COMMUNITIES,
};
use tokio::runtime::Runtime;
use tracing::warn;

use crate::color_picker::{color32, color_picker};

pub struct AppInit {
    pub runtime: Arc<Runtime>,
    pub view_model: MainViewModel,
    pub init: InitHandle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AppView {
    Home,
    MyPosts,
    Communities,
    NewPost,
    Colors,
}

pub struct JetApp {
    runtime: Arc<Runtime>,
    view_model: MainViewModel,
    init: Option<InitHandle>,
    init_status: Option<(bool, String)>,
    all_posts: CacheReader<Vec<PostModel>>,
    my_posts: CacheReader<Vec<PostModel>>,
    subreddits: CacheReader<Vec<String>>,
    toggles: ToggleWatch,
    current_view: AppView,
    community_search: String,
    new_post_title: String,
    new_post_text: String,
    save_feedback: Option<(bool, String)>,
    colors: Vec<ColorModel>,
    selected_color: ColorModel,
}

impl JetApp {
    pub fn new(init: AppInit) -> Self {
        let view_model = init.view_model;
        let app = Self {
            all_posts: view_model.all_posts(),
            my_posts: view_model.my_posts(),
            subreddits: view_model.subreddits(),
            toggles: view_model.subreddits_toggle(),
            runtime: init.runtime,
            view_model,
            init: Some(init.init),
            init_status: None,
            current_view: AppView::Home,
            community_search: String::new(),
            new_post_title: String::new(),
            new_post_text: String::new(),
            save_feedback: None,
            colors: ColorModel::presets(),
            selected_color: ColorModel::default(),
        };
        app.view_model.search_communities("");
        app
    }

    fn poll_init(&mut self) {
        let finished = self.init.as_ref().is_some_and(InitHandle::is_finished);
        if !finished {
            return;
        }
        if let Some(handle) = self.init.take() {
            self.init_status = Some(match self.runtime.block_on(handle.wait()) {
                Ok(report) if report.seeded > 0 => {
                    (true, format!("Added {} sample posts", report.seeded))
                }
                Ok(report) => (true, format!("Loaded {} posts", report.loaded)),
                Err(err) => {
                    warn!(error = %err, "start-up failed");
                    (false, format!("Could not load posts: {err}"))
                }
            });
        }
    }

    fn setup_theme(&self, ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();
        let accent_color = Color32::from_rgb(255, 69, 0);
        style.visuals.selection.bg_fill = Color32::from_rgba_unmultiplied(255, 69, 0, 60);
        style.visuals.selection.stroke = Stroke::new(1.0, accent_color);
        style.visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, accent_color);
        style.visuals.widgets.noninteractive.rounding = Rounding::same(3.0);
        style.visuals.widgets.inactive.rounding = Rounding::same(3.0);
        style.visuals.widgets.hovered.rounding = Rounding::same(3.0);
        style.visuals.widgets.active.rounding = Rounding::same(3.0);
        style.spacing.item_spacing = egui::vec2(10.0, 8.0);
        style.spacing.button_padding = egui::vec2(10.0, 6.0);
        ctx.set_style(style);
    }

    fn draw_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("navigation").show(ctx, |ui| {
            ui.horizontal(|ui| {
                for (view, label) in [
                    (AppView::Home, "🏠 Home"),
                    (AppView::MyPosts, "👤 My posts"),
                    (AppView::Communities, "🔍 Communities"),
                    (AppView::NewPost, "➕ New post"),
                    (AppView::Colors, "🎨 Colors"),
                ] {
                    ui.selectable_value(&mut self.current_view, view, label);
                }
            });
            if let Some((ok, msg)) = &self.init_status {
                let color = if *ok {
                    Color32::from_rgb(67, 160, 71)
                } else {
                    Color32::from_rgb(229, 57, 53)
                };
                ui.label(egui::RichText::new(msg.clone()).color(color).size(12.0));
            }
        });
    }

    fn draw_posts(ui: &mut egui::Ui, snapshot: Snapshot<Vec<PostModel>>, empty_text: &str) {
        let posts = match snapshot {
            Snapshot::Pending => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading posts…");
                });
                return;
            }
            Snapshot::Ready(posts) => posts,
        };
        if posts.is_empty() {
            ui.label(egui::RichText::new(empty_text).weak());
            return;
        }
        egui::ScrollArea::vertical().show(ui, |ui| {
            for post in &posts {
                ui.group(|ui| {
                    ui.set_width(ui.available_width());
                    ui.label(
                        egui::RichText::new(format!(
                            "r/{} • u/{} • {}",
                            post.subreddit, post.username, post.posted_time
                        ))
                        .weak()
                        .size(12.0),
                    );
                    ui.label(egui::RichText::new(post.title.as_str()).strong().size(16.0));
                    match post.post_type {
                        PostType::Text => {
                            if !post.text.is_empty() {
                                ui.label(post.text.as_str());
                            }
                        }
                        PostType::Image => {
                            let name = post.image.as_deref().unwrap_or("image");
                            ui.label(egui::RichText::new(format!("🖼 {name}")).italics());
                        }
                    }
                    ui.label(
                        egui::RichText::new(format!("⬆ {}   💬 {}", post.likes, post.comments))
                            .size(12.0),
                    );
                });
                ui.add_space(6.0);
            }
        });
    }

    fn draw_communities(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Search:");
            if ui.text_edit_singleline(&mut self.community_search).changed() {
                self.view_model.search_communities(self.community_search.clone());
            }
        });
        ui.separator();

        match self.subreddits.latest() {
            Snapshot::Pending => {
                ui.spinner();
            }
            Snapshot::Ready(found) if found.is_empty() => {
                ui.label(egui::RichText::new("No matching communities").weak());
            }
            Snapshot::Ready(found) => {
                let selected = self.view_model.selected_community();
                for label in found {
                    let is_selected = selected.as_deref() == Some(label.as_str());
                    if ui
                        .selectable_label(is_selected, format!("r/{label}"))
                        .clicked()
                    {
                        let next = if is_selected { None } else { Some(label) };
                        self.view_model.select_community(next);
                    }
                }
            }
        }

        ui.add_space(12.0);
        ui.heading(egui::RichText::new("Followed communities").size(16.0));
        let toggles = self.toggles.current();
        for community in COMMUNITIES {
            let mut value = toggles.get(&community.id).copied().unwrap_or(false);
            if ui
                .checkbox(&mut value, format!("r/{}", community.name))
                .changed()
            {
                self.view_model.toggle_subreddit(value, community.id);
            }
        }
    }

    fn draw_new_post(&mut self, ui: &mut egui::Ui) {
        let community = self.view_model.selected_community();
        ui.label(match &community {
            Some(name) => format!("Posting to r/{name}"),
            None => "No community selected (pick one under Communities)".to_string(),
        });
        ui.label("Title:");
        ui.text_edit_singleline(&mut self.new_post_title);
        ui.label("Text:");
        ui.text_edit_multiline(&mut self.new_post_text);

        ui.horizontal(|ui| {
            if ui.button("Post").clicked() {
                let title = self.new_post_title.trim().to_string();
                if title.is_empty() {
                    self.save_feedback = Some((false, "Title is required".to_string()));
                } else {
                    let text = self.new_post_text.trim().to_string();
                    self.view_model.save_post(PostModel::text_post(title, text));
                    self.new_post_title.clear();
                    self.new_post_text.clear();
                    self.save_feedback = Some((true, "Posted.".to_string()));
                }
            }
            if ui.button("🗑 Delete all posts").clicked() {
                self.view_model.delete_all_posts();
            }
        });

        if let Some((ok, msg)) = &self.save_feedback {
            let color = if *ok {
                Color32::from_rgb(67, 160, 71)
            } else {
                Color32::from_rgb(229, 57, 53)
            };
            ui.label(egui::RichText::new(msg.clone()).color(color).size(13.0));
        }
    }

    fn draw_colors(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let (rect, _) = ui.allocate_exact_size(egui::vec2(24.0, 24.0), egui::Sense::hover());
            ui.painter()
                .circle_filled(rect.center(), 12.0, color32(&self.selected_color));
            ui.label(format!(
                "Selected: {} ({})",
                self.selected_color.name, self.selected_color.hex
            ));
        });
        ui.separator();
        let selected = &mut self.selected_color;
        color_picker(ui, &self.colors, |color| *selected = color.clone());
    }

    fn draw_main_content(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| match self.current_view {
            AppView::Home => Self::draw_posts(ui, self.all_posts.current(), "No posts yet"),
            AppView::MyPosts => {
                Self::draw_posts(ui, self.my_posts.current(), "You have not posted anything")
            }
            AppView::Communities => self.draw_communities(ui),
            AppView::NewPost => self.draw_new_post(ui),
            AppView::Colors => self.draw_colors(ui),
        });
    }
}

impl Drop for JetApp {
    fn drop(&mut self) {
        self.view_model.shutdown();
        if let Some(handle) = self.init.take() {
            handle.abort();
        }
    }
}

impl eframe::App for JetApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.setup_theme(ctx);
        self.poll_init();

        self.draw_top_bar(ctx);
        self.draw_main_content(ctx);

        // Background tasks publish into watch channels; poll them while work is outstanding.
        if self.init.is_some() || self.view_model.pending_tasks() > 0 {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
