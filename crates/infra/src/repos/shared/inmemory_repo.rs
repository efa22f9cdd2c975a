use super::repo::DeleteResult;
use subtrack_domain::{Entity, ID};
use std::sync::Mutex;

/// Useful functions for creating inmemory repositories

pub fn insert<T: Clone>(val: &T, collection: &Mutex<Vec<T>>) {
    let mut collection = collection.lock().unwrap();
    collection.push(val.clone());
}

pub fn insert_many<T: Clone>(vals: &[T], collection: &Mutex<Vec<T>>) {
    let mut collection = collection.lock().unwrap();
    collection.extend_from_slice(vals);
}

/// Replaces the stored value with the same id. Returns false if there was
/// nothing to replace.
pub fn save<T: Clone + Entity>(val: &T, collection: &Mutex<Vec<T>>) -> bool {
    let mut collection = collection.lock().unwrap();
    match collection.iter().position(|item| item.id() == val.id()) {
        Some(index) => {
            collection[index] = val.clone();
            true
        }
        None => false,
    }
}

pub fn find<T: Clone + Entity>(val_id: &ID, collection: &Mutex<Vec<T>>) -> Option<T> {
    let collection = collection.lock().unwrap();
    collection.iter().find(|item| item.id() == val_id).cloned()
}

pub fn find_by<T: Clone, F: FnMut(&T) -> bool>(collection: &Mutex<Vec<T>>, mut compare: F) -> Vec<T> {
    let collection = collection.lock().unwrap();
    collection.iter().filter(|item| compare(item)).cloned().collect()
}

pub fn delete_by<T, F: Fn(&T) -> bool>(collection: &Mutex<Vec<T>>, compare: F) -> DeleteResult {
    let mut collection = collection.lock().unwrap();
    let before = collection.len();
    collection.retain(|item| !compare(item));
    DeleteResult {
        deleted_count: (before - collection.len()) as i64,
    }
}
