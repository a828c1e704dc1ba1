//! Average daily figures over committed aggregates.

use dayroll_types::{DailyAggregate, DateRange, Symbol, SymbolStatistics, round_money};
use rust_decimal::Decimal;

/// Averages the aggregates of `symbol` that fall inside `range`.
///
/// Aggregates for other symbols or dates are ignored. Returns `None` when
/// nothing matches.
pub fn summarize<'a, I>(symbol: &Symbol, range: DateRange, aggregates: I) -> Option<SymbolStatistics>
where
    I: IntoIterator<Item = &'a DailyAggregate>,
{
    let mut days = 0u64;
    let mut open_sum = Decimal::ZERO;
    let mut close_sum = Decimal::ZERO;
    let mut volume_sum = Decimal::ZERO;

    for agg in aggregates
        .into_iter()
        .filter(|a| &a.symbol == symbol && range.contains(a.date))
    {
        days += 1;
        open_sum += agg.open_price;
        close_sum += agg.close_price;
        volume_sum += Decimal::from(agg.volume);
    }

    if days == 0 {
        return None;
    }

    let n = Decimal::from(days);
    Some(SymbolStatistics {
        symbol: symbol.clone(),
        start_date: range.start,
        end_date: range.end,
        days,
        average_daily_open_price: round_money(open_sum / n),
        average_daily_close_price: round_money(close_sum / n),
        average_daily_volume: round_money(volume_sum / n),
    })
}
