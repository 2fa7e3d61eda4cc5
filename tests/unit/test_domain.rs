use paginate::domain::{
    filter::entity::Filter,
    model::entity::ModelDefinition,
    pagination::{
        envelope::assemble,
        errors::PaginateError,
        request::{PaginateOptions, RequestDescriptor},
        resolver::{FALLBACK_LIMIT, PaginationResolver, ResolverConfig},
    },
};
use serde_json::json;

fn item_resolver(config: ResolverConfig) -> PaginationResolver {
    PaginationResolver::new(
        ModelDefinition::new("item", ["name", "description", "status"]),
        config,
    )
}

#[test]
fn fallback_limit_is_ten() {
    assert_eq!(FALLBACK_LIMIT, 10);
    let d = item_resolver(ResolverConfig::default())
        .normalize(&RequestDescriptor::default(), &PaginateOptions::default())
        .unwrap();
    assert_eq!(d.limit, 10);
}

#[test]
fn page_total_law_holds() {
    let resolver = item_resolver(ResolverConfig::default());
    for limit in 1..=12_i64 {
        let request = RequestDescriptor {
            limit: Some(limit),
            ..Default::default()
        };
        let d = resolver
            .normalize(&request, &PaginateOptions::default())
            .unwrap();
        for total in 0..=60_u64 {
            let counters = assemble(Vec::new(), total, &d).counters;
            let limit = limit as u64;
            assert_eq!(counters.page_total, total.div_ceil(limit));
            assert_eq!(counters.page_total == 0, total == 0);
        }
    }
}

#[test]
fn page_maps_to_offset_for_every_page() {
    let resolver = item_resolver(ResolverConfig {
        limit: Some(7),
        max_limit: None,
    });
    for page in 1..=20_i64 {
        let request = RequestDescriptor {
            page: Some(page),
            ..Default::default()
        };
        let d = resolver
            .normalize(&request, &PaginateOptions::default())
            .unwrap();
        assert_eq!(d.skip, (page as u64 - 1) * 7);
    }
}

#[test]
fn max_limit_clamps_override() {
    let d = item_resolver(ResolverConfig {
        limit: Some(10),
        max_limit: Some(5),
    })
    .normalize(
        &RequestDescriptor {
            limit: Some(3),
            ..Default::default()
        },
        &PaginateOptions::with_limit(40),
    )
    .unwrap();
    assert_eq!(d.limit, 5);
}

#[test]
fn request_body_json_round_trips_into_descriptor() {
    let request: RequestDescriptor = serde_json::from_value(json!({
        "page": 2,
        "limit": 5,
        "where": { "status": "active" },
        "sortOrder": { "predicate": "name", "reverse": true },
        "fields": ["name"]
    }))
    .unwrap();

    let d = item_resolver(ResolverConfig::default())
        .normalize(&request, &PaginateOptions::default())
        .unwrap();

    assert_eq!(d.skip, 5);
    assert_eq!(d.order.as_deref(), Some("name DESC"));
    assert_eq!(
        d.filter,
        Some(Filter::try_from(json!({ "status": "active" })).unwrap())
    );
    assert_eq!(
        serde_json::to_value(&d).unwrap(),
        json!({
            "skip": 5,
            "limit": 5,
            "where": { "status": "active" },
            "order": "name DESC",
            "fields": ["name"]
        })
    );
}

#[test]
fn invalid_page_is_an_invalid_argument() {
    let err = item_resolver(ResolverConfig::default())
        .normalize(
            &RequestDescriptor {
                page: Some(0),
                ..Default::default()
            },
            &PaginateOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(err, PaginateError::InvalidArgument(_)));
}
