use crate::store::Store;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) store: Store,
}
