use crate::SearchRunner;
use editor_state::session::SearchSession;
use fltk::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

const PANEL_W: i32 = 260;
const PANEL_H: i32 = 64;
const MARGIN: i32 = 8;

/// The floating find overlay: a term input, a case-sensitivity toggle, and
/// previous/next buttons. Typing searches live; Return jumps to the next
/// occurrence; Escape dismisses the panel. All state changes go straight
/// into the shared [`SearchSession`], so every editor in the process sees
/// the same term.
#[derive(Clone)]
pub struct FindPanel {
    pub group: fltk::group::Group,
    pub input: fltk::input::Input,
    case_button: fltk::button::CheckButton,
    prev_button: fltk::button::Button,
    next_button: fltk::button::Button,
    search: Rc<RefCell<SearchSession>>,
}

impl FindPanel {
    /// Builds the (hidden) panel with its top-right corner at `(right, top)`.
    pub(crate) fn new(right: i32, top: i32, search: Rc<RefCell<SearchSession>>) -> Self {
        let px = right - PANEL_W - MARGIN;
        let py = top + MARGIN;

        let mut group = fltk::group::Group::new(px, py, PANEL_W, PANEL_H, None);
        group.set_frame(fltk::enums::FrameType::BorderBox);
        group.set_color(fltk::enums::Color::from_rgb(30, 33, 39));

        let mut input = fltk::input::Input::new(px + 50, py + 8, PANEL_W - 60, 22, "Find:");
        input.set_label_color(fltk::enums::Color::White);
        input.set_value(&search.borrow().term);

        let mut case_button =
            fltk::button::CheckButton::new(px + 10, py + 34, 130, 22, "Case-sensitive");
        case_button.set_label_color(fltk::enums::Color::White);
        case_button.set_checked(search.borrow().case_sensitive);

        let prev_button = fltk::button::Button::new(px + PANEL_W - 72, py + 34, 30, 22, "<");
        let next_button = fltk::button::Button::new(px + PANEL_W - 40, py + 34, 30, 22, ">");

        group.end();
        group.hide();

        Self {
            group,
            input,
            case_button,
            prev_button,
            next_button,
            search,
        }
    }

    pub(crate) fn wire(&mut self, runner: SearchRunner, canvas: fltk::widget::Widget) {
        // Every keystroke updates the session and searches forward without
        // skipping the current selection, so the match under the caret is
        // kept while the term grows.
        self.input.set_trigger(fltk::enums::CallbackTrigger::Changed);
        self.input.set_callback({
            let search = self.search.clone();
            let mut runner = runner.clone();
            move |i| {
                search.borrow_mut().term = i.value();
                runner.run(true, false);
            }
        });

        self.input.handle({
            let mut runner = runner.clone();
            let mut group = self.group.clone();
            let mut canvas = canvas.clone();
            move |_, ev| {
                if ev != fltk::enums::Event::KeyDown {
                    return false;
                }

                match fltk::app::event_key() {
                    fltk::enums::Key::Enter => {
                        runner.run(true, true);
                        true
                    }
                    fltk::enums::Key::Escape => {
                        group.hide();
                        let _ = canvas.take_focus();
                        canvas.redraw();
                        true
                    }
                    _ => false,
                }
            }
        });

        self.case_button.set_callback({
            let search = self.search.clone();
            move |b| search.borrow_mut().case_sensitive = b.is_checked()
        });

        self.prev_button.set_callback({
            let mut runner = runner.clone();
            move |_| runner.run(false, false)
        });

        self.next_button.set_callback({
            let mut runner = runner;
            move |_| runner.run(true, true)
        });
    }

    /// Keeps the panel glued to the editor's top-right corner.
    pub(crate) fn place(&mut self, right: i32, top: i32) {
        self.group.resize(
            right - PANEL_W - MARGIN,
            top + MARGIN,
            PANEL_W,
            PANEL_H,
        );
    }

    pub fn show_and_focus(&mut self) {
        // Another editor's panel may have changed the session since this
        // one was last visible.
        self.input.set_value(&self.search.borrow().term);
        self.case_button.set_checked(self.search.borrow().case_sensitive);

        self.group.show();
        let _ = self.input.take_focus();
        let _ = self.input.set_position(self.input.value().len() as i32);
    }

    pub fn hide(&mut self) {
        self.group.hide();
    }

    #[must_use]
    pub fn visible(&self) -> bool {
        self.group.visible()
    }

    /// Refreshes the input box after the session term was set elsewhere
    /// (find-selection).
    pub(crate) fn sync_from_session(&mut self) {
        self.input.set_value(&self.search.borrow().term);
    }
}
