//! Model descriptors for the financial-instrument domain.

use crate::descriptor::{FieldDescriptor as F, FieldType as T, ModelDescriptor, TypeRegistry};

const LANGUAGES: &[&str] = &["en", "de", "fr", "it"];

// ── Entities ─────────────────────────────────────────────────────

pub fn issuer() -> ModelDescriptor {
    ModelDescriptor::new("Issuer")
        .field(F::new("lei", T::Str).unique())
        .field(F::new("legal_name", T::Str))
}

pub fn instrument_type() -> ModelDescriptor {
    ModelDescriptor::new("InstrumentType")
        .field(F::new("id", T::Str).unique())
        .field(F::new("name_de", T::Str).with_default())
        .field(F::new("sort_index_de", T::Str).with_default())
}

pub fn trading_venue() -> ModelDescriptor {
    ModelDescriptor::new("TradingVenue")
        .field(F::new("id", T::Str).unique())
        .field(F::new("legal_name", T::Str))
}

pub fn listing() -> ModelDescriptor {
    let market_data = [
        "min_lot_amount",
        "round_lot_amount",
        "interest_calculation_type",
        "pricing_notation_type",
        "pricing_factor",
        "dividend_yield",
    ];

    market_data.iter().fold(
        ModelDescriptor::new("Listing")
            .field(F::new("id", T::Str).unique())
            .field(F::new("ticker", T::Str))
            .field(F::new("trading_place_id", T::Str))
            .field(F::new("instrument_id", T::Str))
            .field(F::new("trading_currency", T::Str))
            .field(F::new("main", T::Bool).with_default())
            .field(F::new("main_for_trading_currency", T::Bool).with_default()),
        |model, name| model.field(F::new(name, T::optional(T::Str))),
    )
}

pub fn cross_currency_rate() -> ModelDescriptor {
    ModelDescriptor::new("CrossCurrencyRate")
        .field(F::new("currency", T::Str))
        .field(F::new("cross_rate", T::Float))
        .field(F::new("date", T::Str))
}

pub fn quote() -> ModelDescriptor {
    ModelDescriptor::new("Quote")
        .field(F::new("instrument_id", T::Str))
        .field(F::new("listing_id", T::Str))
        .field(F::new("quote", T::Float))
        .field(F::new("quote_date", T::Str))
}

/// Flat bond record as loaded from tabular sources.
///
/// Nested bond attributes (interest rate, dates, prices) are flattened to
/// scalars here; their structured form lives in [`bond`].
pub fn bond_record() -> ModelDescriptor {
    let opt_str = || T::optional(T::Str);
    let opt_float = || T::optional(T::Float);

    ModelDescriptor::new("Bond")
        .field(F::new("id", T::Str).unique())
        .field(F::new("isin", opt_str()).unique())
        .field(F::new("name", opt_str()))
        .field(F::new("short_name", opt_str()))
        .field(F::new("currency_of_denomination", opt_str()))
        .field(F::new("denomination", opt_float()))
        .field(F::new("nominal_amount", opt_float()))
        .field(F::new("issuer_id", opt_str()))
        .field(F::new("interest_type", opt_str()))
        .field(F::new("interest_rate", opt_float()))
        .field(F::new("interest_payment_frequency", opt_str()))
        .field(F::new("maturity_date", opt_str()))
        .field(F::new("last_coupon_date", opt_str()))
        .field(F::new("is_callable", T::optional(T::Bool)))
        .field(F::new("underlying_id", opt_str()))
        .field(F::new("conversion_price_value", opt_float()))
        .field(F::new("conversion_price_currency", opt_str()))
}

/// Entities that receive data, constraints, and ontology nodes.
pub fn entities() -> Vec<ModelDescriptor> {
    vec![
        issuer(),
        instrument_type(),
        trading_venue(),
        listing(),
        cross_currency_rate(),
        quote(),
        bond_record(),
    ]
}

// ── Structured Value Types ───────────────────────────────────────

fn single_value(name: &str, ty: T) -> ModelDescriptor {
    ModelDescriptor::new(name).field(F::new("value", ty))
}

pub fn currency() -> ModelDescriptor {
    single_value("Currency", T::Str)
}

pub fn date() -> ModelDescriptor {
    single_value("Date", T::Str)
}

pub fn date_time() -> ModelDescriptor {
    single_value("DateTime", T::Str)
}

pub fn contract_size() -> ModelDescriptor {
    single_value("ContractSize", T::Float)
}

pub fn cfi_code() -> ModelDescriptor {
    single_value("CfiCode", T::Str)
}

pub fn price() -> ModelDescriptor {
    ModelDescriptor::new("Price")
        .field(F::new("type", T::literal(&["actual", "percentage"])))
        .field(F::new("value", T::Float))
        .field(F::new("currency", T::optional(T::object("Currency"))))
}

pub fn currency_amount() -> ModelDescriptor {
    ModelDescriptor::new("CurrencyAmount")
        .field(F::new("amount", T::Float))
        .field(F::new("currency", T::object("Currency")))
}

pub fn interest_rate() -> ModelDescriptor {
    ModelDescriptor::new("InterestRate")
        .field(F::new("type", T::literal(&["fixed", "variable", "staggered"])))
        .field(F::new("value", T::optional(T::Float)))
        .field(F::new("dayCountBasis", T::optional(T::enumeration("DayCountBasis"))))
        .field(F::new("paymentDate", T::optional(T::object("Date"))))
        .field(F::new(
            "paymentFrequency",
            T::optional(T::literal(&[
                "annual",
                "monthly",
                "quarterly",
                "semiAnnual",
                "weekly",
                "atMaturity",
                "other",
            ])),
        ))
        .field(F::new("basis", T::optional(T::Str)))
        .field(F::new("spread", T::optional(T::Float)))
}

pub fn financial_instrument_identification() -> ModelDescriptor {
    ModelDescriptor::new("FinancialInstrumentIdentification")
        .field(F::new("identifier", T::Str))
        .field(F::new(
            "type",
            T::literal(&[
                "isin",
                "sedol",
                "cusip",
                "ric",
                "tickerSymbol",
                "bloomberg",
                "cta",
                "quick",
                "wertpapier",
                "dutch",
                "valoren",
                "sicovam",
                "belgian",
                "common",
                "iso3",
                "otherProprietaryIdentification",
            ]),
        ))
}

pub fn shorttext() -> ModelDescriptor {
    ModelDescriptor::new("Shorttext")
        .field(F::new("language", T::literal(LANGUAGES)))
        .field(F::new("value", T::Str))
}

pub fn longtext() -> ModelDescriptor {
    ModelDescriptor::new("Longtext")
        .field(F::new("language", T::literal(LANGUAGES)))
        .field(F::new("value", T::Str))
}

pub fn dividend_policy() -> ModelDescriptor {
    ModelDescriptor::new("DividendPolicy")
        .field(F::new(
            "frequency",
            T::optional(T::literal(&["annual", "semiAnnual", "quarterly", "monthly", "irregular"])),
        ))
        .field(F::new("lastDividendDate", T::optional(T::object("Date"))))
        .field(F::new("dividendPerShare", T::optional(T::object("CurrencyAmount"))))
        .field(F::new("payoutRatio", T::optional(T::Float)))
}

pub fn key_figures() -> ModelDescriptor {
    ModelDescriptor::new("KeyFigures")
        .field(F::new("marketCap", T::optional(T::object("CurrencyAmount"))))
        .field(F::new("sharesOutstanding", T::optional(T::Float)))
        .field(F::new("eps", T::optional(T::Float)))
        .field(F::new("peRatio", T::optional(T::Float)))
        .field(F::new("roe", T::optional(T::Float)))
}

// ── Instrument Hierarchy ─────────────────────────────────────────

/// Abstract supertype of all concrete instruments.
pub fn financial_instrument() -> ModelDescriptor {
    ModelDescriptor::new("FinancialInstrument")
        .abstract_marker()
        .field(F::new("type", T::enumeration("FinancialInstrumentType")))
        .field(F::new("name", T::object("Longtext")))
        .field(F::new("shortName", T::optional(T::object("Shorttext"))))
        .field(F::new(
            "identificationList",
            T::optional(T::list(T::object("FinancialInstrumentIdentification"))),
        ))
        .field(F::new("cfiCode", T::optional(T::object("CfiCode"))))
        .field(F::new("currencyOfDenomination", T::optional(T::object("Currency"))))
        .field(F::new("hasFactor", T::optional(T::Bool)))
        .field(F::new("factor", T::optional(T::Float)))
        .field(F::new("additionalDetails", T::optional(T::Str)))
}

pub fn bond() -> ModelDescriptor {
    ModelDescriptor::new("Bond")
        .extends(&financial_instrument())
        .field(F::new("interestRate", T::optional(T::object("InterestRate"))))
        .field(F::new("maturityDate", T::optional(T::object("Date"))))
        .field(F::new("issueDate", T::optional(T::object("Date"))))
        .field(F::new("conversionPrice", T::optional(T::object("Price"))))
        .field(F::new("minimumDenomination", T::optional(T::Float)))
        .field(F::new("minimumIncrement", T::optional(T::Float)))
        .field(F::new(
            "underlyingFinancialInstrument",
            T::optional(T::object("FinancialInstrument")),
        ))
}

pub fn equity() -> ModelDescriptor {
    ModelDescriptor::new("Equity")
        .extends(&financial_instrument())
        .field(F::new("dividend_policy", T::optional(T::object("DividendPolicy"))))
        .field(F::new("key_figures", T::optional(T::object("KeyFigures"))))
}

pub fn option() -> ModelDescriptor {
    ModelDescriptor::new("Option")
        .extends(&financial_instrument())
        .field(F::new("expiryDate", T::optional(T::object("Date"))))
        .field(F::new("exercisePrice", T::optional(T::object("Price"))))
        .field(F::new("contractSize", T::optional(T::object("ContractSize"))))
        .field(F::new("optionType", T::optional(T::enumeration("OptionType"))))
        .field(F::new("optionStyle", T::optional(T::enumeration("OptionStyle"))))
        .field(F::new(
            "underlyingFinancialInstrument",
            T::optional(T::object("FinancialInstrument")),
        ))
}

/// Concrete subtypes of [`financial_instrument`].
pub fn instrument_subtypes() -> Vec<ModelDescriptor> {
    vec![bond(), equity(), option()]
}

/// Registry of structured value types, including the abstract marker (which
/// discovery skips).
pub fn structured_types() -> TypeRegistry {
    TypeRegistry::new(vec![
        currency(),
        date(),
        date_time(),
        contract_size(),
        price(),
        currency_amount(),
        interest_rate(),
        financial_instrument_identification(),
        shorttext(),
        longtext(),
        cfi_code(),
        financial_instrument(),
        dividend_policy(),
        key_figures(),
    ])
}
