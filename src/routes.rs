use crate::{
    auth::{gated, ANY_MEMBER, LANDLORD_ONLY, TENANT_ONLY},
    handlers::{
        calendar, chores, conversations, expenses, groups, inventory, lists, messages, profiles,
        properties, reviews, stores, users,
    },
    middleware::{
        cors_layer, envelope_method_not_allowed, health_check, not_found,
        propagate_request_id_layer, request_id_layer, root, trace_layer, validate_request_size,
    },
    state::AppState,
};
use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, patch, post, put},
    Router,
};
use tower::ServiceBuilder;

/// Build the application router with every resource and global layer
pub fn create_app(state: AppState) -> Router {
    let s = &state;

    let public_routes = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/users/login", post(users::login))
        .route("/api/users/verify", get(users::verify_email));

    let user_routes = Router::new()
        .route(
            "/api/users",
            gated(s, ANY_MEMBER, get(users::list_users)).merge(post(users::create_user)),
        )
        .route("/api/users/me", gated(s, ANY_MEMBER, get(users::me)))
        .route("/api/users/user/:id", gated(s, ANY_MEMBER, get(users::get_user)));

    let property_routes = Router::new()
        .route(
            "/api/properties",
            gated(
                s,
                LANDLORD_ONLY,
                get(properties::list_properties).post(properties::create_property),
            ),
        )
        .route(
            "/api/properties/search",
            gated(s, ANY_MEMBER, get(properties::search_properties)),
        )
        .route(
            "/api/properties/:id",
            gated(
                s,
                LANDLORD_ONLY,
                get(properties::get_property)
                    .put(properties::update_property)
                    .delete(properties::delete_property),
            ),
        )
        .route(
            "/api/properties/:id/images",
            gated(s, ANY_MEMBER, get(properties::list_images))
                .merge(gated(s, LANDLORD_ONLY, post(properties::upload_image))),
        )
        .route(
            "/api/properties/:id/images/:image_id",
            gated(
                s,
                LANDLORD_ONLY,
                put(properties::update_image).delete(properties::delete_image),
            ),
        );

    let group_routes = Router::new()
        .route("/api/groups", gated(s, LANDLORD_ONLY, post(groups::create_group)))
        .route("/api/groups/landlord", gated(s, LANDLORD_ONLY, get(groups::landlord_groups)))
        .route("/api/groups/tenant", gated(s, TENANT_ONLY, get(groups::tenant_groups)))
        .route(
            "/api/groups/:id",
            gated(
                s,
                LANDLORD_ONLY,
                get(groups::get_group)
                    .put(groups::update_group)
                    .delete(groups::delete_group),
            ),
        )
        .route("/api/groups/:id/landlord", gated(s, ANY_MEMBER, get(groups::group_landlord)))
        .route("/api/groups/:id/property", gated(s, ANY_MEMBER, get(groups::group_property)))
        .route(
            "/api/groups/:id/participants",
            gated(s, ANY_MEMBER, get(groups::group_participants)),
        );

    let chore_routes = Router::new()
        .route("/api/chores", gated(s, ANY_MEMBER, post(chores::create_chore)))
        .route("/api/chores/chore/:id", gated(s, ANY_MEMBER, get(chores::get_chore)))
        .route(
            "/api/chores/:id",
            gated(
                s,
                ANY_MEMBER,
                get(chores::list_chores)
                    .put(chores::update_chore)
                    .delete(chores::delete_chore),
            ),
        );

    let expense_routes = Router::new()
        .route("/api/expenses", gated(s, ANY_MEMBER, post(expenses::create_expense)))
        .route("/api/expenses/:id", gated(s, ANY_MEMBER, get(expenses::list_expenses)))
        .route(
            "/api/expenses/:id/complete",
            gated(s, ANY_MEMBER, put(expenses::complete_expense)),
        );

    let calendar_routes = Router::new()
        .route("/api/calendar", gated(s, ANY_MEMBER, post(calendar::create_event)))
        .route(
            "/api/calendar/upcoming/:id",
            gated(s, ANY_MEMBER, get(calendar::upcoming_events)),
        )
        .route("/api/calendar/event/:id", gated(s, ANY_MEMBER, get(calendar::get_event)))
        .route(
            "/api/calendar/:id",
            gated(
                s,
                ANY_MEMBER,
                get(calendar::list_events)
                    .put(calendar::update_event)
                    .delete(calendar::delete_event),
            ),
        );

    let list_routes = Router::new()
        .route("/api/lists/items", gated(s, ANY_MEMBER, get(lists::list_items)))
        .route("/api/lists/createList", gated(s, ANY_MEMBER, post(lists::create_list)))
        .route("/api/lists/deleteList", gated(s, ANY_MEMBER, post(lists::delete_list)))
        .route("/api/lists/createItem", gated(s, ANY_MEMBER, post(lists::create_item)))
        .route("/api/lists/updateItem", gated(s, ANY_MEMBER, post(lists::update_item)))
        .route("/api/lists/deleteItem", gated(s, ANY_MEMBER, post(lists::delete_item)))
        .route("/api/lists/:id", gated(s, ANY_MEMBER, get(lists::list_lists)));

    let inventory_routes = Router::new()
        .route(
            "/api/inventory/createInventory",
            gated(s, ANY_MEMBER, post(inventory::add_item)),
        )
        .route("/api/inventory/deleteItem", gated(s, ANY_MEMBER, post(inventory::delete_item)))
        .route(
            "/api/inventory/removeQuantity",
            gated(s, ANY_MEMBER, post(inventory::remove_quantity)),
        )
        .route(
            "/api/inventory/getLowItem/:id",
            gated(s, ANY_MEMBER, get(inventory::low_stock)),
        )
        .route("/api/inventory/:id", gated(s, ANY_MEMBER, get(inventory::list_inventory)));

    let conversation_routes = Router::new()
        .route("/api/conversations/dm", gated(s, ANY_MEMBER, post(conversations::create_dm)))
        .route(
            "/api/conversations/group",
            gated(s, ANY_MEMBER, post(conversations::create_group_chat)),
        )
        .route(
            "/api/conversations/participants/add",
            gated(s, ANY_MEMBER, post(conversations::add_participant)),
        )
        .route(
            "/api/conversations/participants/remove",
            gated(s, ANY_MEMBER, delete(conversations::remove_participant)),
        )
        .route(
            "/api/conversations/conversation/:id",
            gated(s, ANY_MEMBER, get(conversations::get_conversation)),
        )
        .route(
            "/api/conversations/:id",
            gated(s, ANY_MEMBER, get(conversations::list_conversations)),
        )
        .route("/api/messages/send", gated(s, ANY_MEMBER, post(messages::send_message)))
        .route(
            "/api/messages/conversation/:id",
            gated(s, ANY_MEMBER, get(messages::list_messages)),
        )
        .route("/api/messages/read", gated(s, ANY_MEMBER, patch(messages::mark_read)));

    let profile_routes = Router::new()
        .route("/api/profile/:id", gated(s, ANY_MEMBER, get(profiles::get_profile)))
        .route(
            "/api/profile/updateProfile/:id",
            gated(s, ANY_MEMBER, post(profiles::update_profile)),
        )
        .route(
            "/api/reviews",
            gated(s, ANY_MEMBER, get(reviews::list_reviews))
                .merge(gated(s, TENANT_ONLY, post(reviews::create_review))),
        )
        .route("/api/stores/getEntries", gated(s, ANY_MEMBER, get(stores::list_entries)))
        .route(
            "/api/stores/createEntries",
            gated(s, ANY_MEMBER, post(stores::create_entry)),
        );

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(property_routes)
        .merge(group_routes)
        .merge(chore_routes)
        .merge(expense_routes)
        .merge(calendar_routes)
        .merge(list_routes)
        .merge(inventory_routes)
        .merge(conversation_routes)
        .merge(profile_routes)
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                // Request tracing
                .layer(trace_layer())
                // Request ID
                .layer(request_id_layer())
                .layer(propagate_request_id_layer())
                // CORS
                .layer(cors_layer(&state.config))
                // Wrong method on a known path
                .layer(from_fn(envelope_method_not_allowed))
                // Request size validation
                .layer(from_fn_with_state(state.config.clone(), validate_request_size))
                // Body size limit
                .layer(DefaultBodyLimit::max(state.config.server.max_content_length as usize)),
        )
        .with_state(state)
}
