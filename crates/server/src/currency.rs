//! Conversions between the engine and wire currency enums.

pub(crate) fn to_api(currency: engine::Currency) -> api_types::Currency {
    match currency {
        engine::Currency::Eur => api_types::Currency::Eur,
        engine::Currency::Usd => api_types::Currency::Usd,
        engine::Currency::Chf => api_types::Currency::Chf,
        engine::Currency::Gbp => api_types::Currency::Gbp,
        engine::Currency::Thb => api_types::Currency::Thb,
        engine::Currency::Jpy => api_types::Currency::Jpy,
    }
}

pub(crate) fn to_engine(currency: api_types::Currency) -> engine::Currency {
    match currency {
        api_types::Currency::Eur => engine::Currency::Eur,
        api_types::Currency::Usd => engine::Currency::Usd,
        api_types::Currency::Chf => engine::Currency::Chf,
        api_types::Currency::Gbp => engine::Currency::Gbp,
        api_types::Currency::Thb => engine::Currency::Thb,
        api_types::Currency::Jpy => engine::Currency::Jpy,
    }
}
