//! Browser platform: drag-and-drop payloads, the file system entry API and
//! file picker inputs.
//!
//! Everything a drop carries has to be pulled out of the `DataTransfer`
//! while the event handler is still running; the browser empties it
//! afterwards. Directory contents and file bytes are read later, through
//! callback APIs wrapped into promises.

use std::rc::Rc;
use std::time::Duration;

use js_sys::{Array, Function, Promise, Uint8Array};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    DataTransfer, DragEvent, Event, EventTarget, File, FileSystemDirectoryEntry,
    FileSystemDirectoryReader, FileSystemEntry, FileSystemFileEntry, HtmlInputElement,
};
use web_time::SystemTime;

use super::{
    DirEntry, DirectoryHandle, DirectoryReader, DropItem, DropPayload, Entry, FileHandle,
    PickerInput,
};
use crate::constants::PICKER_ACCEPT;
use crate::error::IntakeError;
use crate::intake::Dropzone;

/// Best-effort message for a JavaScript error value.
fn js_error_message(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

/// A browser `File`.
#[derive(Debug, Clone)]
pub struct WebFile {
    file: File,
}

impl WebFile {
    /// Wrap a browser file.
    pub fn new(file: File) -> Self {
        Self { file }
    }
}

impl FileHandle for WebFile {
    fn name(&self) -> String {
        self.file.name()
    }

    fn size(&self) -> u64 {
        self.file.size().max(0.0) as u64
    }

    fn media_type(&self) -> Option<String> {
        Some(self.file.type_()).filter(|t| !t.is_empty())
    }

    fn last_modified(&self) -> Option<SystemTime> {
        let millis = self.file.last_modified();
        (millis.is_finite() && millis >= 0.0)
            .then(|| SystemTime::UNIX_EPOCH + Duration::from_millis(millis as u64))
    }

    async fn read_bytes(&self) -> Result<Vec<u8>, IntakeError> {
        let buffer = JsFuture::from(self.file.array_buffer())
            .await
            .map_err(|e| IntakeError::read(self.name(), js_error_message(&e)))?;
        Ok(Uint8Array::new(&buffer).to_vec())
    }
}

/// A dropped directory, reached through the file system entry API.
#[derive(Debug, Clone)]
pub struct WebDir {
    entry: FileSystemDirectoryEntry,
}

impl WebDir {
    /// Wrap a directory entry.
    pub fn new(entry: FileSystemDirectoryEntry) -> Self {
        Self { entry }
    }
}

impl DirectoryHandle for WebDir {
    type File = WebFile;
    type Reader = WebDirReader;

    fn name(&self) -> String {
        self.entry.name()
    }

    fn create_reader(&self) -> WebDirReader {
        WebDirReader {
            name: self.entry.name(),
            reader: self.entry.create_reader(),
        }
    }
}

/// Batched reader over a [`WebDir`].
///
/// Browsers return at most a hundred or so entries per call.
#[derive(Debug)]
pub struct WebDirReader {
    name: String,
    reader: FileSystemDirectoryReader,
}

/// One `readEntries` call.
async fn read_entry_batch(reader: &FileSystemDirectoryReader) -> Result<Array, JsValue> {
    let promise = Promise::new(&mut |resolve: Function, reject: Function| {
        if let Err(e) = reader.read_entries_with_callback_and_callback(&resolve, &reject) {
            let _ = reject.call1(&JsValue::NULL, &e);
        }
    });
    Ok(JsFuture::from(promise).await?.unchecked_into())
}

/// Resolve a file entry to its `File`.
async fn entry_file(entry: &FileSystemFileEntry) -> Result<File, JsValue> {
    let promise = Promise::new(&mut |resolve: Function, reject: Function| {
        entry.file_with_callback_and_callback(&resolve, &reject);
    });
    Ok(JsFuture::from(promise).await?.unchecked_into())
}

impl DirectoryReader for WebDirReader {
    type Dir = WebDir;

    async fn read_entries(&mut self) -> Result<Vec<DirEntry<WebDir>>, IntakeError> {
        loop {
            let batch = read_entry_batch(&self.reader)
                .await
                .map_err(|e| IntakeError::directory_read(&self.name, js_error_message(&e)))?;
            if batch.length() == 0 {
                return Ok(Vec::new());
            }

            let mut entries = Vec::with_capacity(batch.length() as usize);
            for value in batch.iter() {
                let entry: FileSystemEntry = value.unchecked_into();
                let name = entry.name();
                if entry.is_directory() {
                    entries.push(Entry::Directory(WebDir::new(entry.unchecked_into())));
                } else if entry.is_file() {
                    match entry_file(entry.unchecked_ref()).await {
                        Ok(file) => entries.push(Entry::File(WebFile::new(file))),
                        Err(e) => log::error!("Cannot open '{}': {}", name, js_error_message(&e)),
                    }
                }
            }

            // An empty result would end the walk, so a batch whose files all
            // failed to open is followed by another read
            if !entries.is_empty() {
                return Ok(entries);
            }
        }
    }
}

/// Build a payload from a drop's data transfer.
///
/// Must be called from inside the drop handler.
pub fn payload_from_data_transfer(transfer: &DataTransfer) -> DropPayload<WebDir> {
    let list = transfer.items();
    let mut items = Vec::with_capacity(list.length() as usize);
    for index in 0..list.length() {
        let Some(item) = list.get(index) else {
            continue;
        };
        if item.kind() != "file" {
            items.push(DropItem::Unknown);
            continue;
        }

        let file = item.get_as_file().ok().flatten().map(WebFile::new);
        let entry = item.webkit_get_as_entry().ok().flatten();
        let drop_item = match (entry, file) {
            (Some(entry), _) if entry.is_directory() => {
                DropItem::Entry(Entry::Directory(WebDir::new(entry.unchecked_into())))
            }
            (Some(_), Some(file)) => DropItem::Entry(Entry::File(file)),
            (None, Some(file)) => DropItem::File(file),
            (_, None) => DropItem::Unknown,
        };
        items.push(drop_item);
    }

    let files = transfer
        .files()
        .map(|list| {
            (0..list.length())
                .filter_map(|index| list.get(index))
                .map(WebFile::new)
                .collect()
        })
        .unwrap_or_default();

    DropPayload::new(items, files)
}

/// Build a payload from a drop event, if it carries any data.
pub fn payload_from_drag_event(event: &DragEvent) -> Option<DropPayload<WebDir>> {
    event
        .data_transfer()
        .map(|transfer| payload_from_data_transfer(&transfer))
}

/// A file `<input>` element.
#[derive(Debug, Clone)]
pub struct WebPicker {
    input: HtmlInputElement,
}

impl WebPicker {
    /// Wrap a file input.
    pub fn new(input: HtmlInputElement) -> Self {
        Self { input }
    }
}

impl PickerInput for WebPicker {
    type File = WebFile;

    fn selected_files(&self) -> Vec<WebFile> {
        self.input
            .files()
            .map(|list| {
                (0..list.length())
                    .filter_map(|index| list.get(index))
                    .map(WebFile::new)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn clear(&self) {
        self.input.set_value("");
    }
}

/// Wire a drop target and a file input to a dropzone.
///
/// Dropping onto `target` runs a drop intake; clicking it opens the picker;
/// a picker selection runs a selection intake. The listeners live for the
/// rest of the page's life.
///
/// `input` must not sit inside `target`, or its own clicks would reopen it.
pub fn install(
    target: &EventTarget,
    input: &HtmlInputElement,
    dropzone: Rc<Dropzone<WebDir>>,
) -> Result<(), JsValue> {
    input.set_type("file");
    input.set_multiple(true);
    input.set_accept(PICKER_ACCEPT);

    // Without this the browser opens the file instead of firing `drop`
    let on_dragover = Closure::wrap(Box::new(move |event: DragEvent| {
        event.prevent_default();
    }) as Box<dyn FnMut(DragEvent)>);
    target.add_event_listener_with_callback("dragover", on_dragover.as_ref().unchecked_ref())?;
    on_dragover.forget();

    let drop_zone = dropzone.clone();
    let on_drop = Closure::wrap(Box::new(move |event: DragEvent| {
        event.prevent_default();
        let Some(payload) = payload_from_drag_event(&event) else {
            log::warn!("Drop carried no data");
            return;
        };
        let dropzone = drop_zone.clone();
        wasm_bindgen_futures::spawn_local(async move {
            dropzone.handle_drop(payload).await;
        });
    }) as Box<dyn FnMut(DragEvent)>);
    target.add_event_listener_with_callback("drop", on_drop.as_ref().unchecked_ref())?;
    on_drop.forget();

    let picker_input = input.clone();
    let on_click = Closure::wrap(Box::new(move |_event: Event| {
        picker_input.click();
    }) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
    on_click.forget();

    let picker = WebPicker::new(input.clone());
    let on_change = Closure::wrap(Box::new(move |_event: Event| {
        let dropzone = dropzone.clone();
        let picker = picker.clone();
        wasm_bindgen_futures::spawn_local(async move {
            dropzone.handle_selection(&picker).await;
        });
    }) as Box<dyn FnMut(Event)>);
    input.add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())?;
    on_change.forget();

    log::info!("Dropzone installed");
    Ok(())
}
