use editor_state::document::Document;
use editor_state::session::SearchSession;
use fltk::prelude::{GroupExt, MenuExt, WidgetExt};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn window_title(doc: &Document) -> String {
    let name = doc
        .path()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .unwrap_or("untitled");

    if doc.is_modified() {
        format!("SourcePad - {name} (edited)")
    } else {
        format!("SourcePad - {name}")
    }
}

/// Save-as flow. Cancelling the chooser is not a failure.
fn prompt_save_as(doc: &Rc<RefCell<Document>>) -> bool {
    match fltk::dialog::file_chooser("Save As", "*", ".", false) {
        Some(path) => doc.borrow_mut().save_as(std::path::Path::new(&path)),
        None => true,
    }
}

fn save_document(doc: &Rc<RefCell<Document>>) {
    let has_path = doc.borrow().path().is_some();
    let saved = if has_path {
        doc.borrow_mut().save()
    } else {
        prompt_save_as(doc)
    };

    if !saved {
        fltk::dialog::alert_default("The file could not be saved.");
    }
}

pub fn main() {
    env_logger::init();
    log::info!("starting SourcePad");

    let app = fltk::app::App::default();
    let mut win = fltk::window::Window::default()
        .with_size(800, 600)
        .with_label("SourcePad");

    let search = Rc::new(RefCell::new(SearchSession::default()));
    let doc = Rc::new(RefCell::new(Document::untitled()));
    let editor = Rc::new(RefCell::new(ui::TextEditor::new(
        0,
        30,
        800,
        570,
        doc.clone(),
        search.clone(),
    )));
    let mut menu = fltk::menu::MenuBar::default().with_size(800, 30);

    win.resizable(&editor.borrow().group);

    // The window title follows the document: every change event marks it
    // stale, a timer repaints it.
    let title_stale = Rc::new(Cell::new(true));
    {
        let title_stale = title_stale.clone();
        doc.borrow_mut()
            .add_listener(Box::new(move |_| title_stale.set(true)));
    }
    {
        let doc = doc.clone();
        let title_stale = title_stale.clone();
        let mut win = win.clone();
        fltk::app::add_timeout3(0.25, move |handle| {
            if title_stale.replace(false) {
                win.set_label(&window_title(&doc.borrow()));
            }
            fltk::app::repeat_timeout3(0.25, handle);
        });
    }

    menu.add(
        "File/Open...",
        fltk::enums::Shortcut::Ctrl | 'o',
        fltk::menu::MenuFlag::Normal,
        {
            let doc = doc.clone();
            let editor = editor.clone();
            move |_| {
                if let Some(file_path) = fltk::dialog::file_chooser(
                    "Open File",
                    "*.{txt,rs,md,log,cpp,cc,cxx,c,h,hpp,hxx,mm,m}",
                    ".",
                    false,
                ) {
                    doc.borrow_mut().open_file(file_path);
                    editor.borrow_mut().on_content_changed();
                    fltk::app::redraw();
                }
            }
        },
    );

    menu.add(
        "File/Revert",
        fltk::enums::Shortcut::None,
        fltk::menu::MenuFlag::Normal,
        {
            let doc = doc.clone();
            let editor = editor.clone();
            move |_| {
                doc.borrow_mut().reload();
                editor.borrow_mut().on_content_changed();
                fltk::app::redraw();
            }
        },
    );

    menu.add(
        "File/Save",
        fltk::enums::Shortcut::Ctrl | 's',
        fltk::menu::MenuFlag::Normal,
        {
            let doc = doc.clone();
            move |_| save_document(&doc)
        },
    );

    menu.add(
        "File/Save As...",
        fltk::enums::Shortcut::Ctrl | fltk::enums::Shortcut::Shift | 's',
        fltk::menu::MenuFlag::MenuDivider,
        {
            let doc = doc.clone();
            move |_| {
                if !prompt_save_as(&doc) {
                    fltk::dialog::alert_default("The file could not be saved.");
                }
            }
        },
    );

    menu.add(
        "Edit/Undo",
        fltk::enums::Shortcut::Ctrl | 'z',
        fltk::menu::MenuFlag::Normal,
        {
            let doc = doc.clone();
            let editor = editor.clone();
            move |_| {
                doc.borrow_mut().undo();
                editor.borrow_mut().on_content_changed();
            }
        },
    );

    menu.add(
        "Edit/Redo",
        fltk::enums::Shortcut::Ctrl | fltk::enums::Shortcut::Shift | 'z',
        fltk::menu::MenuFlag::MenuDivider,
        {
            let doc = doc.clone();
            let editor = editor.clone();
            move |_| {
                doc.borrow_mut().redo();
                editor.borrow_mut().on_content_changed();
            }
        },
    );

    menu.add(
        "Edit/Find...",
        fltk::enums::Shortcut::Ctrl | 'f',
        fltk::menu::MenuFlag::Normal,
        {
            let editor = editor.clone();
            move |_| editor.borrow_mut().show_find_panel()
        },
    );

    menu.add(
        "Edit/Find Selection",
        fltk::enums::Shortcut::Ctrl | 'l',
        fltk::menu::MenuFlag::Normal,
        {
            let editor = editor.clone();
            move |_| editor.borrow_mut().find_selection()
        },
    );

    menu.add(
        "Edit/Find Next",
        fltk::enums::Shortcut::Ctrl | 'g',
        fltk::menu::MenuFlag::Normal,
        {
            let editor = editor.clone();
            move |_| editor.borrow_mut().find_next(true, true)
        },
    );

    menu.add(
        "Edit/Find Previous",
        fltk::enums::Shortcut::Ctrl | fltk::enums::Shortcut::Shift | 'g',
        fltk::menu::MenuFlag::MenuDivider,
        {
            let editor = editor.clone();
            move |_| editor.borrow_mut().find_next(false, false)
        },
    );

    menu.add(
        "Edit/Insert Component Class...",
        fltk::enums::Shortcut::None,
        fltk::menu::MenuFlag::Normal,
        {
            let editor = editor.clone();
            move |_| editor.borrow_mut().insert_component_class()
        },
    );

    // Capture the caret/scroll state before the window goes away, so a
    // reopened document restores it.
    win.set_callback({
        let editor = editor.clone();
        move |w| {
            editor.borrow().save_view_state();
            w.hide();
        }
    });

    win.end();
    win.show();

    app.run().unwrap();
}
