use dioxus::prelude::*;
use std::future::Future;
use types::{Keyed, Listing, RequestTracker};

use crate::{ErrorState, error_message, is_unauthorized, use_error};

/// A page's listing together with the means to refresh it.
pub struct ListingHandle<T: 'static> {
    pub listing: Signal<Listing<T>>,
    reload: Callback<()>,
    errors: ErrorState,
}

impl<T: 'static> Clone for ListingHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> Copy for ListingHandle<T> {}

impl<T: Keyed + 'static> ListingHandle<T> {
    /// Refetch the whole collection, superseding any fetch still in flight.
    pub fn reload(&self) {
        self.reload.call(());
    }

    /// Apply a successful mutation locally, then refetch the server copy.
    pub fn settle(&self, edit: impl FnOnce(&mut Listing<T>)) {
        let mut listing = self.listing;
        {
            let mut listing = listing.write();
            listing.clear_error();
            edit(&mut listing);
        }
        self.reload();
    }

    /// Record a failed mutation. Rows stay as they were.
    pub fn fail(&self, err: &ServerFnError) {
        if is_unauthorized(err) {
            let mut errors = self.errors;
            errors.set_server_error(err);
            return;
        }
        let mut listing = self.listing;
        listing.write().set_error(error_message(err));
    }
}

/// Fetch a collection on mount and keep it in a [`Listing`].
///
/// Only the newest fetch may settle the listing. Unmounting the page cancels
/// whatever is still in flight.
pub fn use_listing<T, F, Fut>(fetch: F) -> ListingHandle<T>
where
    T: Keyed + 'static,
    F: Fn() -> Fut + 'static,
    Fut: Future<Output = Result<Vec<T>, ServerFnError>> + 'static,
{
    let mut errors = use_error();
    let mut listing = use_signal(Listing::<T>::default);
    let tracker = use_hook(RequestTracker::default);

    let reload = use_callback({
        let tracker = tracker.clone();
        move |()| {
            let ticket = tracker.begin();
            listing.write().begin_load();
            let request = fetch();

            spawn(async move {
                let result = request.await;
                if !ticket.is_current() {
                    return;
                }
                match result {
                    Ok(rows) => listing.write().finish_load(Ok(rows)),
                    Err(err) => {
                        if is_unauthorized(&err) {
                            errors.set_server_error(&err);
                        }
                        listing.write().finish_load(Err(error_message(&err)));
                    }
                }
            });
        }
    });

    use_effect(move || reload.call(()));
    use_drop(move || tracker.cancel());

    ListingHandle {
        listing,
        reload,
        errors,
    }
}
