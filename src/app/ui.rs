use super::JobProgress;
use super::ZipAnalyzer;
use crate::summary::{Block, BlockKind, ResultView, Span};
use eframe::egui::{self, Align2, Color32, RichText};
use rfd::FileDialog;
use std::time::Instant;

const ACCENT: Color32 = Color32::from_rgb(161, 89, 225);
const ERROR_RED: Color32 = Color32::from_rgb(220, 50, 50);
const SUCCESS_GREEN: Color32 = Color32::from_rgb(25, 135, 84);

impl ZipAnalyzer {
    pub fn render(&mut self, ctx: &egui::Context) {
        let blocked = self.session.alert.is_some();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(!blocked, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.add_space(20.0);
                    ui.vertical_centered(|ui| {
                        ui.heading("프로젝트 분석기");
                        ui.add_space(5.0);
                        ui.label(
                            RichText::new("프로젝트 ZIP 파일을 업로드하면 구조를 분석해 요약합니다")
                                .color(ui.visuals().text_color().gamma_multiply(0.7)),
                        );
                    });

                    ui.add_space(20.0);
                    self.render_file_selection(ui);
                    ui.add_space(20.0);

                    ui.vertical_centered(|ui| {
                        let can_submit = !self.session.is_loading();
                        ui.add_enabled_ui(can_submit, |ui| {
                            let button = egui::Button::new("📤 분석 시작")
                                .min_size(egui::vec2(200.0, 40.0));
                            if ui.add(button).clicked() {
                                self.start_analysis();
                            }
                        });
                    });

                    ui.add_space(20.0);

                    if self.session.is_loading() {
                        self.render_loading(ui);
                        ui.add_space(10.0);
                    }

                    if let Some(error) = &self.session.error_message {
                        ui.group(|ui| {
                            ui.set_width(ui.available_width());
                            ui.colored_label(ERROR_RED, format!("❌ {}", error));
                        });
                        ui.add_space(10.0);
                    }

                    if let Some(view) = self.session.result.clone() {
                        self.render_result(ui, &view);
                    }

                    ui.add_space(20.0);
                });
            });
        });

        self.render_full_analysis(ctx);
        self.render_alert(ctx);
    }

    fn render_file_selection(&mut self, ui: &mut egui::Ui) {
        ui.label("분석할 프로젝트를 ZIP 파일로 선택하세요");
        ui.add_space(10.0);
        ui.group(|ui| {
            ui.horizontal(|ui| {
                let picker = ui.add_enabled(
                    !self.session.is_loading(),
                    egui::Button::new("📁 ZIP 파일 선택"),
                );
                if picker.clicked() {
                    if let Some(path) = FileDialog::new().add_filter("ZIP", &["zip"]).pick_file() {
                        self.selected_file = Some(path);
                    }
                }
                if let Some(path) = &self.selected_file {
                    ui.label(format!("선택됨: {}", path.display()));
                }
            });
        });
    }

    fn render_loading(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.add(egui::Spinner::new().color(ACCENT));
                ui.label(self.session.get_status_text());
            });
            if matches!(self.session.progress, JobProgress::Polling { .. }) {
                ui.label(
                    RichText::new("분석이 끝나면 결과가 자동으로 표시됩니다.")
                        .color(ui.visuals().text_color().gamma_multiply(0.7)),
                );
            }
            ui.add_space(4.0);
            if ui.button("⏹ 취소").clicked() {
                self.session.cancel();
            }
        });
    }

    fn render_result(&mut self, ui: &mut egui::Ui, view: &ResultView) {
        ui.group(|ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(RichText::new("프로젝트 ID").strong());
                ui.label(RichText::new(&view.project_id).monospace());
            });
            ui.horizontal(|ui| {
                ui.colored_label(ACCENT, &view.files_label);
                ui.separator();
                ui.label(
                    RichText::new(&view.timestamp)
                        .color(ui.visuals().text_color().gamma_multiply(0.7)),
                );
            });

            ui.separator();
            render_summary(ui, &view.summary_blocks);
            ui.separator();

            ui.horizontal(|ui| {
                if ui.button("📄 전체 분석 보기").clicked() {
                    self.session.open_full_analysis();
                }

                let now = Instant::now();
                let label = self.session.copy_feedback.label(now);
                let mut button = egui::Button::new(label);
                if self.session.copy_feedback.is_acknowledged(now) {
                    button = button.fill(SUCCESS_GREEN);
                }
                if ui.add(button).clicked() {
                    self.copy_analysis();
                }
            });
        });
    }

    fn render_full_analysis(&mut self, ctx: &egui::Context) {
        if !self.session.show_full_analysis {
            return;
        }

        let mut open = true;
        let mut text = self.session.analysis_content.as_str();
        egui::Window::new("전체 분석 내용")
            .open(&mut open)
            .collapsible(false)
            .resizable(true)
            .default_size([640.0, 480.0])
            .show(ctx, |ui| {
                egui::ScrollArea::both().show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut text)
                            .font(egui::TextStyle::Monospace)
                            .desired_width(f32::INFINITY),
                    );
                });
            });
        self.session.show_full_analysis = open;
    }

    fn render_alert(&mut self, ctx: &egui::Context) {
        let Some(message) = self.session.alert.clone() else {
            return;
        };

        let mut dismissed = false;
        egui::Window::new("알림")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(&message);
                ui.add_space(8.0);
                ui.vertical_centered(|ui| {
                    if ui.button("확인").clicked() {
                        dismissed = true;
                    }
                });
            });
        if dismissed {
            self.session.dismiss_alert();
        }
    }
}

fn span_text(span: &Span) -> RichText {
    let text = RichText::new(&span.text);
    if span.bold {
        text.strong()
    } else {
        text
    }
}

fn render_summary(ui: &mut egui::Ui, blocks: &[Block]) {
    for block in blocks {
        match block.kind {
            BlockKind::Spacer => {
                ui.add_space(8.0);
            }
            BlockKind::Heading(level) => {
                let size = match level {
                    4 => 20.0,
                    5 => 17.0,
                    _ => 15.0,
                };
                ui.add_space(4.0);
                ui.horizontal_wrapped(|ui| {
                    ui.spacing_mut().item_spacing.x = 0.0;
                    for span in &block.spans {
                        ui.label(span_text(span).size(size).strong());
                    }
                });
            }
            BlockKind::ListItem => {
                ui.horizontal_wrapped(|ui| {
                    ui.spacing_mut().item_spacing.x = 0.0;
                    ui.label("  • ");
                    for span in &block.spans {
                        ui.label(span_text(span));
                    }
                });
            }
            BlockKind::Text => {
                ui.horizontal_wrapped(|ui| {
                    ui.spacing_mut().item_spacing.x = 0.0;
                    for span in &block.spans {
                        ui.label(span_text(span));
                    }
                });
            }
        }
    }
}

