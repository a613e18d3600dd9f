pub mod find_panel;

use editor_core::highlight::{TokenKind, Tokenizer};
use editor_state::document::Document;
use editor_state::session::{FileCategory, SearchSession, ViewState};
use fltk::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

/// One indent level. The C++ editors insert spaces, never tab characters.
pub const TAB: &str = "    ";

// ==========================================
// 1. STATE
// ==========================================
pub struct State {
    pub doc: Rc<RefCell<Document>>,
    pub search: Rc<RefCell<SearchSession>>,
    pub tokenizer: Box<dyn Tokenizer>,
    pub cursor_visible: bool,
    pub scroll_offset: usize,
    pub scrolloff: usize,
    pub last_interaction: std::time::Instant,
}

// ==========================================
// 2. MAIN COMPONENT API
// ==========================================
pub struct TextEditor {
    pub group: fltk::group::Group,
    pub canvas: fltk::widget::Widget,
    pub scrollbar: fltk::valuator::Scrollbar,
    pub find_panel: find_panel::FindPanel,
    pub state: Rc<RefCell<State>>,
    pub line_height: i32,
}

impl TextEditor {
    pub fn new(
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        doc: Rc<RefCell<Document>>,
        search: Rc<RefCell<SearchSession>>,
    ) -> Self {
        doc.borrow_mut().ensure_loaded();
        let tokenizer = doc.borrow().category().tokenizer();

        let grp = fltk::group::Group::default().with_pos(x, y).with_size(w, h);

        let state = Rc::new(RefCell::new(State {
            doc: doc.clone(),
            search: search.clone(),
            tokenizer,
            cursor_visible: false,
            scroll_offset: 0,
            scrolloff: 5,
            last_interaction: std::time::Instant::now(),
        }));

        // Put the caret and scroll position back where a previous view of
        // this document left them.
        let saved = doc.borrow().view_state();
        if let Some(saved) = saved {
            doc.borrow_mut().cursor = saved.cursor;
            state.borrow_mut().scroll_offset = saved.scroll_offset;
        }

        let line_height = 16;

        let mut canvas = fltk::widget::Widget::default()
            .with_pos(x, y)
            .with_size(w - 15, h);
        let mut scrollbar = fltk::valuator::Scrollbar::default()
            .with_pos(x + w - 15, y)
            .with_size(15, h);

        scrollbar.set_type(fltk::valuator::ScrollbarType::VerticalNice);
        scrollbar.set_color(fltk::enums::Color::from_rgb(200, 200, 200));
        scrollbar.set_selection_color(fltk::enums::Color::from_rgb(100, 100, 100));
        scrollbar.set_step(0.5, 1);

        let mut find_panel =
            find_panel::FindPanel::new(x + w - 15, y, search.clone());

        grp.resizable(&canvas);
        grp.end();

        LayoutSync::apply_to_scrollbar(
            &mut state.borrow_mut(),
            &mut scrollbar,
            canvas.height(),
            line_height,
        );

        let runner = SearchRunner {
            state: state.clone(),
            canvas: canvas.clone(),
            scrollbar: scrollbar.clone(),
            line_height,
        };

        Renderer::wire(&mut canvas, state.clone(), line_height);
        find_panel.wire(runner.clone(), canvas.clone());
        Controller::wire(
            &mut canvas,
            &mut scrollbar,
            state.clone(),
            line_height,
            find_panel.clone(),
            runner,
        );

        Self {
            group: grp,
            canvas,
            scrollbar,
            find_panel,
            state,
            line_height,
        }
    }

    /// Re-syncs scrollbar, tokenizer, and canvas after the document was
    /// swapped or edited outside the controller (menu actions, reload).
    pub fn on_content_changed(&mut self) {
        {
            let mut st = self.state.borrow_mut();
            let tokenizer = st.doc.borrow().category().tokenizer();
            st.tokenizer = tokenizer;
        }

        LayoutSync::apply_to_scrollbar(
            &mut self.state.borrow_mut(),
            &mut self.scrollbar,
            self.canvas.height(),
            self.line_height,
        );
        self.canvas.redraw();
    }

    pub fn show_find_panel(&mut self) {
        self.find_panel.show_and_focus();
    }

    /// Searches for the session's current term from the caret.
    pub fn find_next(&mut self, forward: bool, skip_current_selection: bool) {
        self.runner().run(forward, skip_current_selection);
    }

    /// Seeds the search term from the current selection, then jumps to the
    /// next occurrence.
    pub fn find_selection(&mut self) {
        let selected = {
            let st = self.state.borrow();
            let text = st.doc.borrow().get_selected_text();
            text
        };

        if selected.is_empty() {
            return;
        }

        {
            let st = self.state.borrow();
            st.search.borrow_mut().term = selected;
        }
        self.find_panel.sync_from_session();
        self.runner().run(true, true);
    }

    /// Prompts for a class name until it is a valid identifier (or the
    /// dialog is cancelled), then inserts the component skeleton at the
    /// caret. Only meaningful for C++ documents.
    pub fn insert_component_class(&mut self) {
        let is_cpp = {
            let st = self.state.borrow();
            let category = st.doc.borrow().category();
            category == FileCategory::CppSource
        };
        if !is_cpp {
            return;
        }

        loop {
            let Some(name) =
                fltk::dialog::input_default("Class name for the new component:", "")
            else {
                break;
            };

            let trimmed = name.trim().to_string();
            if editor_core::cpp::is_valid_identifier(&trimmed) {
                {
                    let st = self.state.borrow();
                    st.doc
                        .borrow_mut()
                        .insert(&editor_core::cpp::component_class_code(&trimmed));
                }
                self.on_content_changed();
                break;
            }

            // Fall through and ask again.
            log::debug!("rejected class name {trimmed:?}");
        }
    }

    /// Hands the caret/scroll position back to the document, to be restored
    /// when it is next opened in a view.
    pub fn save_view_state(&self) {
        let st = self.state.borrow();
        let mut d = st.doc.borrow_mut();
        let state = ViewState {
            cursor: d.cursor,
            scroll_offset: st.scroll_offset,
        };
        d.store_view_state(state);
    }

    fn runner(&self) -> SearchRunner {
        SearchRunner {
            state: self.state.clone(),
            canvas: self.canvas.clone(),
            scrollbar: self.scrollbar.clone(),
            line_height: self.line_height,
        }
    }
}

// ==========================================
// 3. SEARCH PLUMBING
// ==========================================

/// Everything a find command needs to run a search and bring the hit into
/// view. Cloned freely into callbacks; the fltk handles are cheap.
#[derive(Clone)]
pub(crate) struct SearchRunner {
    state: Rc<RefCell<State>>,
    canvas: fltk::widget::Widget,
    scrollbar: fltk::valuator::Scrollbar,
    line_height: i32,
}

impl SearchRunner {
    pub(crate) fn run(&mut self, forward: bool, skip_current_selection: bool) {
        let query = {
            let st = self.state.borrow();
            let query = st.search.borrow().query();
            query
        };
        if query.term.is_empty() {
            return;
        }

        let direction = if forward {
            editor_core::search::Direction::Forward
        } else {
            editor_core::search::Direction::Backward
        };

        let found = {
            let st = self.state.borrow();
            let mut d = st.doc.borrow_mut();
            d.find_next(&query, direction, skip_current_selection)
        };

        // A miss leaves the selection and viewport untouched.
        if found {
            let mut st = self.state.borrow_mut();
            st.cursor_visible = true;
            st.last_interaction = std::time::Instant::now();
            LayoutSync::sync_view_to_cursor(&mut st, self.canvas.height(), self.line_height);
            LayoutSync::apply_to_scrollbar(
                &mut st,
                &mut self.scrollbar,
                self.canvas.height(),
                self.line_height,
            );
            drop(st);
            self.canvas.redraw();
            self.scrollbar.redraw();
        }
    }
}

// ==========================================
// 4. LAYOUT & SCROLL MATH
// ==========================================
struct LayoutSync;

impl LayoutSync {
    fn apply_to_scrollbar(
        state: &mut State,
        scrollbar: &mut fltk::valuator::Scrollbar,
        canvas_h: i32,
        line_h: i32,
    ) {
        let doc_lines = state.doc.borrow().get_line_count();
        let visible_lines = (canvas_h / line_h).max(1) as usize;
        let max_scroll = doc_lines.saturating_sub(visible_lines);

        state.scroll_offset = state.scroll_offset.clamp(0, max_scroll);
        scrollbar.set_bounds(0.0, max_scroll as f64);
        scrollbar.set_slider_size((visible_lines as f32 / doc_lines.max(1) as f32).clamp(0.0, 1.0));
        scrollbar.set_value(state.scroll_offset as f64);
    }

    fn sync_view_to_cursor(state: &mut State, canvas_h: i32, line_h: i32) {
        let visible_lines = (canvas_h / line_h).max(1) as usize;
        let actual_scrolloff = state.scrolloff.min(visible_lines.saturating_sub(1) / 2);
        let head_row = state.doc.borrow().cursor.head.row;
        let top = state.scroll_offset + actual_scrolloff;
        let bottom = state.scroll_offset + visible_lines.saturating_sub(1) - actual_scrolloff;

        if head_row < top {
            state.scroll_offset = head_row.saturating_sub(actual_scrolloff);
        } else if head_row > bottom {
            state.scroll_offset = head_row + actual_scrolloff + 1 - visible_lines;
        }
    }

    fn sync_cursor_to_view(state: &mut State, canvas_h: i32, line_h: i32) {
        let visible_lines = (canvas_h / line_h).max(1) as usize;
        let actual_scrolloff = state.scrolloff.min(visible_lines.saturating_sub(1) / 2);

        let top = state.scroll_offset + actual_scrolloff;
        let bottom = state.scroll_offset + visible_lines.saturating_sub(1) - actual_scrolloff;

        let mut d = state.doc.borrow_mut();
        let total_lines = d.get_line_count();
        let mut r = d.cursor.head.row;

        while r < top && r + 1 < total_lines {
            let target_len = d.get_visible_line_len_at(r + 1).unwrap_or(0);
            let is_last = r + 2 >= total_lines;
            d.cursor.move_down(target_len, is_last, false);
            r = d.cursor.head.row;
        }

        while r > bottom && r > 0 {
            let target_len = d.get_visible_line_len_at(r - 1).unwrap_or(0);
            d.cursor.move_up(target_len, false);
            r = d.cursor.head.row;
        }
    }
}

// ==========================================
// 5. RENDERER (View)
// ==========================================
struct Renderer;

impl Renderer {
    const FONT_SIZE: i32 = 16;
    const LEFT_PAD: i32 = 6;
    const MARGIN_W: i32 = 45;

    fn wire(canvas: &mut fltk::widget::Widget, state: Rc<RefCell<State>>, line_h: i32) {
        canvas.draw({
            let state = state.clone();
            move |w| {
                let be = state.borrow();
                let d = be.doc.borrow();

                Self::draw_bg(w);
                Self::draw_selection(w, &be, &d, line_h);
                Self::draw_text(w, &be, &d, line_h);
                Self::draw_cursor(w, &be, &d, line_h);
            }
        });

        let mut t_canvas = canvas.clone();
        fltk::app::add_timeout3(0.5, move |handle| {
            let mut be = state.borrow_mut();
            if be.last_interaction.elapsed().as_millis() >= 500 {
                be.cursor_visible = !be.cursor_visible;
                t_canvas.redraw();
            } else {
                be.cursor_visible = true;
            }
            fltk::app::repeat_timeout3(0.5, handle);
        });
    }

    fn draw_bg(w: &mut fltk::widget::Widget) {
        fltk::draw::draw_rect_fill(
            w.x(),
            w.y(),
            w.width(),
            w.height(),
            fltk::enums::Color::from_rgb(40, 44, 52),
        );
    }

    fn draw_selection(w: &mut fltk::widget::Widget, be: &State, d: &Document, line_h: i32) {
        let (start, end) = d.cursor.range();

        if start == end {
            return;
        }

        fltk::draw::set_font(fltk::enums::Font::Courier, Self::FONT_SIZE);

        let char_w = fltk::draw::width("a") as i32;
        let base_x = w.x() + Self::MARGIN_W + Self::LEFT_PAD;
        let selection_color = fltk::enums::Color::from_rgb(62, 68, 81);

        for i in start.row..=end.row {
            if i < be.scroll_offset || i > be.scroll_offset + (w.height() / line_h) as usize + 1 {
                continue;
            }

            let y = w.y() + ((i - be.scroll_offset) as i32 * line_h);

            let start_col = if i == start.row { start.col as i32 } else { 0 };
            let end_col = if i == end.row {
                end.col as i32
            } else {
                d.get_visible_line_len_at(i).unwrap_or(0) as i32 + 1
            };

            let rect_x = base_x + (start_col * char_w);
            let rect_w = (end_col - start_col) * char_w;

            fltk::draw::draw_rect_fill(rect_x, y, rect_w, line_h, selection_color);
        }
    }

    fn draw_text(w: &mut fltk::widget::Widget, be: &State, d: &Document, line_h: i32) {
        fltk::draw::set_font(fltk::enums::Font::Courier, Self::FONT_SIZE);

        let char_w = fltk::draw::width("a") as i32;
        let base_x = w.x() + Self::MARGIN_W + Self::LEFT_PAD;
        let end = std::cmp::min(
            d.get_line_count(),
            be.scroll_offset + (w.height() / line_h) as usize + 1,
        );

        for i in be.scroll_offset..end {
            let Some(text) = d.get_line_stripped(i) else {
                continue;
            };
            let y = w.y() + ((i - be.scroll_offset) as i32 * line_h);

            fltk::draw::set_draw_color(fltk::enums::Color::from_rgb(120, 120, 120));
            fltk::draw::draw_text2(
                &format!("{:3}", i + 1),
                w.x(),
                y,
                Self::MARGIN_W - 5,
                line_h,
                fltk::enums::Align::RightTop,
            );

            // One draw call per token run, colored by kind. Columns are
            // bytes; the font is monospaced, so byte * char width holds for
            // the ASCII sources this targets.
            for run in be.tokenizer.tokenize_line(text) {
                fltk::draw::set_draw_color(Self::token_color(run.kind));
                fltk::draw::draw_text2(
                    &text[run.range.clone()],
                    base_x + run.range.start as i32 * char_w,
                    y,
                    w.width() - Self::MARGIN_W,
                    line_h,
                    fltk::enums::Align::Left,
                );
            }
        }
    }

    fn token_color(kind: TokenKind) -> fltk::enums::Color {
        match kind {
            TokenKind::Keyword => fltk::enums::Color::from_rgb(198, 120, 221),
            TokenKind::Literal => fltk::enums::Color::from_rgb(152, 195, 121),
            TokenKind::Comment => fltk::enums::Color::from_rgb(92, 99, 112),
            TokenKind::Number => fltk::enums::Color::from_rgb(209, 154, 102),
            TokenKind::Punctuation => fltk::enums::Color::from_rgb(171, 178, 191),
            TokenKind::Identifier | TokenKind::Plain => {
                fltk::enums::Color::from_rgb(220, 223, 228)
            }
        }
    }

    fn draw_cursor(w: &mut fltk::widget::Widget, be: &State, d: &Document, line_h: i32) {
        if !be.cursor_visible {
            return;
        }
        let head = d.cursor.head;

        if head.row >= be.scroll_offset
            && head.row <= be.scroll_offset + (w.height() / line_h) as usize
        {
            let x = w.x()
                + Self::MARGIN_W
                + Self::LEFT_PAD
                + (head.col as i32 * fltk::draw::width("a") as i32);
            let y = w.y() + ((head.row - be.scroll_offset) as i32 * line_h);

            fltk::draw::draw_rect_fill(
                x,
                y + (line_h - fltk::draw::height()) / 2,
                2,
                fltk::draw::height(),
                fltk::enums::Color::White,
            );
        }
    }
}

// ==========================================
// 6. CONTROLLER (Input & Events)
// ==========================================
struct Controller;

impl Controller {
    fn wire(
        canvas: &mut fltk::widget::Widget,
        sb: &mut fltk::valuator::Scrollbar,
        state: Rc<RefCell<State>>,
        lh: i32,
        panel: find_panel::FindPanel,
        runner: SearchRunner,
    ) {
        sb.set_callback({
            let state = state.clone();
            let mut c = canvas.clone();
            let mut sbc = sb.clone();
            move |s| {
                state.borrow_mut().scroll_offset = s.value() as usize;
                Self::refresh_view(&mut state.borrow_mut(), &mut c, &mut sbc, lh);
            }
        });

        let st = state.clone();
        let mut handle_sb = sb.clone();
        let mut panel = panel;
        let mut runner = runner;

        canvas.handle(move |c, ev| match ev {
            fltk::enums::Event::Enter => {
                if let Some(mut w) = c.window() {
                    w.set_cursor(fltk::enums::Cursor::Insert);
                }
                true
            }
            fltk::enums::Event::Leave => {
                if let Some(mut w) = c.window() {
                    w.set_cursor(fltk::enums::Cursor::Default);
                }
                true
            }
            fltk::enums::Event::MouseWheel => {
                Self::on_mouse_wheel(c, &mut st.borrow_mut(), &mut handle_sb, lh)
            }
            fltk::enums::Event::Resize => {
                panel.place(c.x() + c.width(), c.y());
                Self::on_resize(c, &mut st.borrow_mut(), &mut handle_sb, lh)
            }
            fltk::enums::Event::Push => Self::on_push(c, &mut st.borrow_mut(), &mut handle_sb, lh),
            fltk::enums::Event::Drag => Self::on_drag(c, &mut st.borrow_mut(), &mut handle_sb, lh),
            fltk::enums::Event::Shortcut => {
                let event_key = fltk::app::event_key();
                let shift = fltk::app::event_state().contains(fltk::enums::EventState::Shift);

                if event_key == fltk::enums::Key::from_char('v') {
                    fltk::app::paste(c);
                } else if event_key == fltk::enums::Key::from_char('c') {
                    return Self::on_copy(&mut st.borrow_mut());
                } else if event_key == fltk::enums::Key::from_char('x') {
                    return Self::on_cut(c, &mut st.borrow_mut(), &mut handle_sb, lh);
                } else if event_key == fltk::enums::Key::from_char('f') {
                    panel.show_and_focus();
                } else if event_key == fltk::enums::Key::from_char('g') {
                    runner.run(!shift, !shift);
                }

                true
            }
            fltk::enums::Event::Paste => {
                Self::on_paste(c, &mut st.borrow_mut(), &mut handle_sb, lh)
            }
            fltk::enums::Event::KeyDown => {
                if fltk::app::event_key() == fltk::enums::Key::Escape {
                    // Escape dismisses the find overlay and nothing else.
                    if panel.visible() {
                        panel.hide();
                        c.redraw();
                    }
                    return true;
                }
                Self::on_keydown(c, &mut st.borrow_mut(), &mut handle_sb, lh)
            }
            fltk::enums::Event::Focus | fltk::enums::Event::Unfocus => true,
            _ => false,
        });
    }

    // --- Utility Input Math ---

    fn mouse_to_pos(c: &fltk::widget::Widget, be: &State, lh: i32) -> (usize, usize) {
        fltk::draw::set_font(fltk::enums::Font::Courier, Renderer::FONT_SIZE);
        let row = be.scroll_offset + ((fltk::app::event_y() - c.y()) / lh).max(0) as usize;
        let rel_x = fltk::app::event_x() - (c.x() + Renderer::MARGIN_W + Renderer::LEFT_PAD);
        let col = if rel_x < 0 {
            0
        } else {
            (rel_x / fltk::draw::width("a") as i32) as usize
        };

        let d = be.doc.borrow();
        let max_row = d.get_line_count().saturating_sub(1);
        let t_row = row.min(max_row);
        let line_len = d.get_visible_line_len_at(t_row).unwrap_or(0);
        let t_col = col.min(line_len);

        (t_row, t_col)
    }

    // --- Event Handlers ---

    fn on_mouse_wheel(
        c: &mut fltk::widget::Widget,
        be: &mut State,
        sb: &mut fltk::valuator::Scrollbar,
        lh: i32,
    ) -> bool {
        let dy = fltk::app::event_dy_value();
        if dy == 0 {
            return false;
        }

        let old_off = be.scroll_offset;
        be.scroll_offset = (old_off as isize).saturating_add((dy * 3) as isize).max(0) as usize;

        if be.scroll_offset != old_off {
            // Only enforce scrolloff (moving the cursor to stay visible) if
            // we are NOT selecting
            if !fltk::app::event_state().contains(fltk::enums::EventState::Button1) {
                LayoutSync::sync_cursor_to_view(be, c.height(), lh);
            }

            LayoutSync::apply_to_scrollbar(be, sb, c.height(), lh);
            c.redraw();
            sb.redraw();

            be.last_interaction = std::time::Instant::now();
        }
        true
    }

    fn on_resize(
        c: &mut fltk::widget::Widget,
        be: &mut State,
        sb: &mut fltk::valuator::Scrollbar,
        lh: i32,
    ) -> bool {
        LayoutSync::sync_view_to_cursor(be, c.height(), lh);
        LayoutSync::apply_to_scrollbar(be, sb, c.height(), lh);
        false
    }

    fn on_push(
        c: &mut fltk::widget::Widget,
        be: &mut State,
        sb: &mut fltk::valuator::Scrollbar,
        lh: i32,
    ) -> bool {
        if c.take_focus().is_err() {
            return false;
        }
        let (row, col) = Self::mouse_to_pos(c, be, lh);

        let mut d = be.doc.borrow_mut();
        d.cursor = editor_core::cursor::Cursor::new(row, col);
        drop(d);

        Self::refresh_cursor(be, c, sb, lh)
    }

    fn on_drag(
        c: &mut fltk::widget::Widget,
        be: &mut State,
        sb: &mut fltk::valuator::Scrollbar,
        lh: i32,
    ) -> bool {
        let (row, col) = Self::mouse_to_pos(c, be, lh);

        let mut d = be.doc.borrow_mut();
        d.cursor
            .set_head(editor_core::cursor::Position::new(row, col));
        drop(d);

        Self::refresh_cursor(be, c, sb, lh)
    }

    fn on_keydown(
        c: &mut fltk::widget::Widget,
        be: &mut State,
        sb: &mut fltk::valuator::Scrollbar,
        lh: i32,
    ) -> bool {
        let key = fltk::app::event_key();
        let shift = fltk::app::event_state().contains(fltk::enums::EventState::Shift);

        let d = be.doc.borrow_mut();
        let row = d.cursor.head.row;
        let is_last = row + 1 >= d.get_line_count();
        let is_cpp = d.category() == FileCategory::CppSource;

        drop(d);

        let handled = match key {
            fltk::enums::Key::Up if row > 0 => {
                let mut d = be.doc.borrow_mut();
                let prev_len = d.get_visible_line_len_at(row - 1).unwrap_or(0);
                d.cursor.move_up(prev_len, shift);
                true
            }
            fltk::enums::Key::Down if !is_last => {
                let mut d = be.doc.borrow_mut();
                let next_len = d.get_visible_line_len_at(row + 1).unwrap_or(0);
                d.cursor.move_down(next_len, is_last, shift);
                true
            }
            fltk::enums::Key::Left => {
                let mut d = be.doc.borrow_mut();
                let prev_len = if row > 0 && d.cursor.head.col == 0 {
                    d.get_visible_line_len_at(row - 1).unwrap_or(0)
                } else {
                    0
                };
                d.cursor.move_left(prev_len, shift);
                true
            }
            fltk::enums::Key::Right => {
                let mut d = be.doc.borrow_mut();
                let curr_len = d.get_visible_line_len_at(row).unwrap_or(0);
                d.cursor.move_right(curr_len, is_last, shift);
                true
            }
            fltk::enums::Key::BackSpace => {
                let mut d = be.doc.borrow_mut();
                d.delete(true);
                true
            }
            fltk::enums::Key::Delete => {
                let mut d = be.doc.borrow_mut();
                d.delete(false);
                true
            }
            fltk::enums::Key::Enter => {
                let mut d = be.doc.borrow_mut();
                if is_cpp {
                    d.handle_return_key(TAB);
                } else {
                    d.insert("\n");
                }
                true
            }
            fltk::enums::Key::Tab => {
                let mut d = be.doc.borrow_mut();
                d.insert(TAB);
                true
            }
            _ => false,
        };

        if !handled {
            let text = fltk::app::event_text();
            if !text.is_empty() && !text.chars().any(|ch| ch.is_control()) {
                let mut d = be.doc.borrow_mut();

                let brace = matches!(text.as_str(), "{" | "}");
                if brace && is_cpp {
                    let brace = if text == "{" { '{' } else { '}' };
                    d.insert_brace(brace, TAB);
                } else {
                    d.insert(&text);
                }

                drop(d);
                return Self::refresh_cursor(be, c, sb, lh);
            }
            return false;
        }

        Self::refresh_cursor(be, c, sb, lh)
    }

    fn on_paste(
        c: &mut fltk::widget::Widget,
        be: &mut State,
        sb: &mut fltk::valuator::Scrollbar,
        lh: i32,
    ) -> bool {
        let text = fltk::app::event_text();

        if text.is_empty() {
            return false;
        }

        let mut d = be.doc.borrow_mut();
        d.insert(&text);
        drop(d);

        Self::refresh_view(be, c, sb, lh);

        true
    }

    fn on_copy(be: &mut State) -> bool {
        let d = be.doc.borrow();
        let selected = d.get_selected_text();
        drop(d);

        if !selected.is_empty() {
            fltk::app::copy(&selected);
            return true;
        }

        false
    }

    fn on_cut(
        c: &mut fltk::widget::Widget,
        be: &mut State,
        sb: &mut fltk::valuator::Scrollbar,
        lh: i32,
    ) -> bool {
        let mut d = be.doc.borrow_mut();
        let selected = d.get_selected_text();

        if selected.is_empty() {
            return true;
        }

        fltk::app::copy(&selected);
        d.delete(true);
        drop(d);

        Self::refresh_view(be, c, sb, lh);

        true
    }

    // --- UI Refresh Helpers ---

    fn refresh_view(
        be: &mut State,
        c: &mut fltk::widget::Widget,
        sb: &mut fltk::valuator::Scrollbar,
        lh: i32,
    ) {
        be.cursor_visible = true;
        be.last_interaction = std::time::Instant::now();
        LayoutSync::sync_cursor_to_view(be, c.height(), lh);
        LayoutSync::apply_to_scrollbar(be, sb, c.height(), lh);
        c.redraw();
        sb.redraw();
    }

    fn refresh_cursor(
        be: &mut State,
        c: &mut fltk::widget::Widget,
        sb: &mut fltk::valuator::Scrollbar,
        lh: i32,
    ) -> bool {
        be.cursor_visible = true;
        be.last_interaction = std::time::Instant::now();
        LayoutSync::sync_view_to_cursor(be, c.height(), lh);
        LayoutSync::apply_to_scrollbar(be, sb, c.height(), lh);
        c.redraw();
        true
    }
}
