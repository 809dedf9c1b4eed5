use std::{
    collections::VecDeque,
    sync::{mpsc::Receiver, Arc, Mutex, MutexGuard},
    thread,
};

use eframe::CreationContext;
use egui::plot::{Legend, Line, Plot};

use crate::neural::optimizer::EpochReport;

/// Any type that can be rendered and updated during training
pub trait Visualizer: eframe::App + 'static {
    const DATA_LIMIT: usize = 20_000;
    fn new(cc: &CreationContext, rx: Receiver<EpochReport>) -> Self;
}

/// Default gui that plots training and testing accuracy per epoch
pub struct AccuracyGui {
    data: Arc<Mutex<VecDeque<EpochReport>>>,
}

impl Visualizer for AccuracyGui {
    /// Initialize AccuracyGui, but also start a thread that listens to a receiver and updates the state
    fn new(cc: &CreationContext, rx: Receiver<EpochReport>) -> Self {
        let data = Arc::new(Mutex::new(VecDeque::new()));
        let data_clone = data.clone();

        let ctx = cc.egui_ctx.clone();
        // ends once training drops the sender
        thread::spawn(move || {
            for report in rx {
                push_bounded(&mut lock(&data_clone), report, Self::DATA_LIMIT);
                ctx.request_repaint()
            }
        });

        Self { data }
    }
}

impl eframe::App for AccuracyGui {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let data = self.get_data();
        let (training, testing) = accuracy_series(&data);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical(|ui| {
                match data.last() {
                    Some(last) => ui.heading(format!(
                        "Epoch {}: training {:.2}%, testing {:.2}%",
                        last.epoch, last.train_accuracy, last.test_accuracy
                    )),
                    None => ui.heading("Waiting for the first epoch"),
                };
                Plot::new("Accuracy")
                    .legend(Legend::default())
                    .include_y(0.0)
                    .include_y(100.0)
                    .show(ui, |plot_ui| {
                        plot_ui.line(Line::new(training).name("training"));
                        plot_ui.line(Line::new(testing).name("testing"));
                    });
            });
        });
    }
}

impl AccuracyGui {
    /// Returns a clone of the data as a vec
    /// Blocks until it can get a lock on its state data
    pub fn get_data(&self) -> Vec<EpochReport> {
        lock(&self.data).iter().copied().collect()
    }
}

/// A panicked writer leaves the queue usable, so poisoning is ignored.
fn lock<T>(data: &Mutex<T>) -> MutexGuard<'_, T> {
    data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn push_bounded(data: &mut VecDeque<EpochReport>, report: EpochReport, limit: usize) {
    if data.len() == limit {
        data.pop_front();
    }
    data.push_back(report);
}

/// `[epoch, accuracy]` points for the training and testing lines.
fn accuracy_series(data: &[EpochReport]) -> (Vec<[f64; 2]>, Vec<[f64; 2]>) {
    data.iter()
        .map(|r| {
            (
                [r.epoch as f64, r.train_accuracy],
                [r.epoch as f64, r.test_accuracy],
            )
        })
        .unzip()
}
