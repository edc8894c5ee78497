//! Geographic, temporal and customer insights over confirmed orders

use chrono::{Datelike, Timelike};
use std::collections::HashMap;

use crate::services::accessors::{
    counts_toward_revenue, customer_email, customer_key, customer_name, order_location,
    order_total,
};
use crate::types::{
    CityStats, GeographicMarker, HighValueCustomer, Order, OrderBundle, PeakHourData,
    ReportClock, SeasonalData, ServiceType, WeeklyPatternData,
};

const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Insertion-ordered grouping. Sorting the result with a stable sort keeps
/// first-seen order among ties.
struct Groups<K, V> {
    index: HashMap<K, usize>,
    entries: Vec<V>,
}

impl<K: std::hash::Hash + Eq, V> Groups<K, V> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    fn entry(&mut self, key: K, init: impl FnOnce() -> V) -> &mut V {
        let entries = &mut self.entries;
        let slot = *self.index.entry(key).or_insert_with(|| {
            entries.push(init());
            entries.len() - 1
        });
        &mut self.entries[slot]
    }

    fn into_vec(self) -> Vec<V> {
        self.entries
    }
}

fn confirmed(orders: &[Order]) -> impl Iterator<Item = &Order> {
    orders.iter().filter(|o| counts_toward_revenue(o))
}

fn average(total: f64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// Insights service for location, time-of-order and customer breakdowns
pub struct Insights;

impl Insights {
    /// City stats keyed by (city, country), in first-seen order
    fn city_stats(orders: &[Order]) -> Vec<CityStats> {
        let mut groups: Groups<(String, String), CityStats> = Groups::new();
        for order in confirmed(orders) {
            let location = order_location(order);
            let (Some(city), Some(country)) = (location.city, location.country) else {
                continue;
            };
            let stats = groups.entry((city.to_string(), country.to_string()), || CityStats {
                city: city.to_string(),
                country: country.to_string(),
                order_count: 0,
                total_revenue: 0.0,
                average_order_value: 0.0,
            });
            stats.order_count += 1;
            stats.total_revenue += order_total(order);
        }

        let mut cities = groups.into_vec();
        for stats in &mut cities {
            stats.average_order_value = average(stats.total_revenue, stats.order_count);
        }
        cities
    }

    pub fn top_cities_by_orders(orders: &[Order], limit: usize) -> Vec<CityStats> {
        let mut cities = Self::city_stats(orders);
        cities.sort_by(|a, b| b.order_count.cmp(&a.order_count));
        cities.truncate(limit);
        cities
    }

    pub fn top_cities_by_revenue(orders: &[Order], limit: usize) -> Vec<CityStats> {
        let mut cities = Self::city_stats(orders);
        cities.sort_by(|a, b| b.total_revenue.total_cmp(&a.total_revenue));
        cities.truncate(limit);
        cities
    }

    /// One marker per exact (lat, lng, city, country) per service.
    /// Orders missing any of the four are skipped.
    pub fn geographic_markers(bundle: &OrderBundle) -> Vec<GeographicMarker> {
        let mut markers = Vec::new();
        for service in ServiceType::ALL {
            markers.extend(Self::service_markers(bundle.service_orders(service), service));
        }
        markers
    }

    fn service_markers(orders: &[Order], service: ServiceType) -> Vec<GeographicMarker> {
        let mut groups: Groups<String, GeographicMarker> = Groups::new();
        for order in confirmed(orders) {
            let location = order_location(order);
            let (Some(lat), Some(lng), Some(city), Some(country)) =
                (location.lat, location.lng, location.city, location.country)
            else {
                continue;
            };
            let id = format!("{}-{}-{}-{}", lat, lng, city, country);
            let marker = groups.entry(id.clone(), || GeographicMarker {
                id,
                lat,
                lng,
                city: city.to_string(),
                country: country.to_string(),
                order_count: 0,
                total_revenue: 0.0,
                service_type: service,
            });
            marker.order_count += 1;
            marker.total_revenue += order_total(order);
        }
        groups.into_vec()
    }

    /// Busiest local hours of day, by order count
    pub fn peak_hours(orders: &[Order], clock: &ReportClock, limit: usize) -> Vec<PeakHourData> {
        let mut groups: Groups<u32, PeakHourData> = Groups::new();
        for order in confirmed(orders) {
            let Some(ts) = &order.created_at else {
                continue;
            };
            let hour = clock.localize(ts).hour();
            let data = groups.entry(hour, || PeakHourData {
                hour,
                order_count: 0,
                total_revenue: 0.0,
                display_hour: format!("{:02}:00", hour),
            });
            data.order_count += 1;
            data.total_revenue += order_total(order);
        }

        let mut hours = groups.into_vec();
        hours.sort_by(|a, b| b.order_count.cmp(&a.order_count));
        hours.truncate(limit);
        hours
    }

    /// Orders per local weekday (Sunday = 0), days without orders omitted
    pub fn weekly_patterns(orders: &[Order], clock: &ReportClock) -> Vec<WeeklyPatternData> {
        let mut days: Vec<WeeklyPatternData> = WEEKDAYS
            .iter()
            .enumerate()
            .map(|(index, day)| WeeklyPatternData {
                day: day.to_string(),
                day_index: index as u32,
                order_count: 0,
                total_revenue: 0.0,
            })
            .collect();

        for order in confirmed(orders) {
            if let Some(ts) = &order.created_at {
                let index = clock.localize(ts).weekday().num_days_from_sunday() as usize;
                days[index].order_count += 1;
                days[index].total_revenue += order_total(order);
            }
        }

        days.retain(|d| d.order_count > 0);
        days
    }

    /// Orders per calendar month of year (January = 0), across all years
    pub fn seasonal_trends(orders: &[Order], clock: &ReportClock) -> Vec<SeasonalData> {
        let mut months: Vec<SeasonalData> = MONTHS
            .iter()
            .enumerate()
            .map(|(index, month)| SeasonalData {
                month: month.to_string(),
                month_index: index as u32,
                order_count: 0,
                total_revenue: 0.0,
                average_order_value: 0.0,
            })
            .collect();

        for order in confirmed(orders) {
            if let Some(ts) = &order.created_at {
                let index = clock.localize(ts).month0() as usize;
                months[index].order_count += 1;
                months[index].total_revenue += order_total(order);
            }
        }

        months.retain(|m| m.order_count > 0);
        for month in &mut months {
            month.average_order_value = average(month.total_revenue, month.order_count);
        }
        months
    }

    /// Customers ranked by total confirmed spend
    pub fn high_value_customers(orders: &[Order], limit: usize) -> Vec<HighValueCustomer> {
        let mut groups: Groups<String, HighValueCustomer> = Groups::new();
        for order in confirmed(orders) {
            let key = customer_key(order).to_string();
            let customer = groups.entry(key.clone(), || HighValueCustomer {
                id: key,
                name: customer_name(order),
                email: customer_email(order).map(String::from),
                total_spent: 0.0,
                order_count: 0,
                average_order_value: 0.0,
                last_order_date: None,
            });
            customer.total_spent += order_total(order);
            customer.order_count += 1;
            if order.created_at > customer.last_order_date {
                customer.last_order_date = order.created_at;
            }
        }

        let mut customers = groups.into_vec();
        for customer in &mut customers {
            customer.average_order_value = average(customer.total_spent, customer.order_count);
        }
        customers.sort_by(|a, b| b.total_spent.total_cmp(&a.total_spent));
        customers.truncate(limit);
        customers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::accessors::test_support::{confirmed, order, with_customer};
    use crate::types::{
        Address, HomeCareDetails, Location, NannyDetails, OrderDetails, PaymentStatus,
        RequestStatus,
    };
    use chrono::{DateTime, TimeZone, Utc};
    use std::collections::BTreeMap;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        // 2024-01-07 is a Sunday
        Utc.with_ymd_and_hms(2024, 1, day, hour, 30, 0).unwrap()
    }

    fn clock() -> ReportClock {
        ReportClock::utc(Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap())
    }

    fn nanny_at(total: f64, city: &str, country: &str, lat: f64, lng: f64) -> Order {
        let mut o = confirmed(ServiceType::Nannies, total, at(8, 9));
        o.details = OrderDetails::Nanny(NannyDetails {
            location: Some(Location {
                city: Some(city.into()),
                country: Some(country.into()),
                lat: Some(lat),
                lng: Some(lng),
                ..Location::default()
            }),
            ..NannyDetails::default()
        });
        o
    }

    fn home_in(total: f64, city: &str, country: &str) -> Order {
        let mut o = confirmed(ServiceType::HomeCare, total, at(8, 9));
        o.details = OrderDetails::HomeCare(HomeCareDetails {
            address: Some(Address {
                city: Some(city.into()),
                country: Some(country.into()),
                ..Address::default()
            }),
            ..HomeCareDetails::default()
        });
        o
    }

    fn cancel(mut o: Order) -> Order {
        o.request_status = RequestStatus::Cancelled;
        o
    }

    // ========== cities ==========

    #[test]
    fn test_top_cities_rankings_are_independent() {
        let orders = vec![
            home_in(100.0, "Dubai", "UAE"),
            home_in(100.0, "Dubai", "UAE"),
            home_in(500.0, "Abu Dhabi", "UAE"),
            nanny_at(10.0, "Riyadh", "KSA", 24.7, 46.7),
        ];

        let by_orders = Insights::top_cities_by_orders(&orders, 10);
        assert_eq!(by_orders[0].city, "Dubai");
        assert_eq!(by_orders[0].order_count, 2);
        assert_eq!(by_orders[0].average_order_value, 100.0);

        let by_revenue = Insights::top_cities_by_revenue(&orders, 2);
        assert_eq!(by_revenue.len(), 2);
        assert_eq!(by_revenue[0].city, "Abu Dhabi");
        assert_eq!(by_revenue[1].city, "Dubai");
    }

    #[test]
    fn test_city_ties_keep_first_seen() {
        let orders = vec![
            home_in(50.0, "Sharjah", "UAE"),
            home_in(50.0, "Dubai", "UAE"),
        ];
        let ranked = Insights::top_cities_by_revenue(&orders, 10);
        assert_eq!(ranked[0].city, "Sharjah");
        assert_eq!(ranked[1].city, "Dubai");
    }

    #[test]
    fn test_cities_skip_cancelled_and_incomplete() {
        let orders = vec![
            cancel(home_in(900.0, "Dubai", "UAE")),
            confirmed(ServiceType::HomeCare, 40.0, at(8, 9)),
            home_in(20.0, "Ajman", "UAE"),
        ];
        let ranked = Insights::top_cities_by_orders(&orders, 10);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].city, "Ajman");
    }

    // ========== markers ==========

    #[test]
    fn test_geographic_markers_group_exact_coordinates() {
        let mut by_service = BTreeMap::new();
        by_service.insert(
            ServiceType::Nannies,
            vec![
                nanny_at(100.0, "Dubai", "UAE", 25.2, 55.27),
                nanny_at(50.0, "Dubai", "UAE", 25.2, 55.27),
                nanny_at(70.0, "Dubai", "UAE", 25.1, 55.2),
                // Home-care addresses carry no coordinates
            ],
        );
        by_service.insert(ServiceType::HomeCare, vec![home_in(10.0, "Dubai", "UAE")]);
        let bundle = OrderBundle::from_services(by_service);

        let markers = Insights::geographic_markers(&bundle);

        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].id, "25.2-55.27-Dubai-UAE");
        assert_eq!(markers[0].order_count, 2);
        assert_eq!(markers[0].total_revenue, 150.0);
        assert_eq!(markers[0].service_type, ServiceType::Nannies);
    }

    // ========== temporal ==========

    #[test]
    fn test_peak_hours_sorted_by_count() {
        let orders = vec![
            confirmed(ServiceType::Nannies, 10.0, at(8, 9)),
            confirmed(ServiceType::Nannies, 10.0, at(9, 14)),
            confirmed(ServiceType::Nannies, 10.0, at(10, 14)),
            cancel(confirmed(ServiceType::Nannies, 10.0, at(10, 9))),
            cancel(confirmed(ServiceType::Nannies, 10.0, at(11, 9))),
        ];

        let hours = Insights::peak_hours(&orders, &clock(), 5);

        assert_eq!(hours.len(), 2);
        assert_eq!(hours[0].hour, 14);
        assert_eq!(hours[0].display_hour, "14:00");
        assert_eq!(hours[1].display_hour, "09:00");
    }

    #[test]
    fn test_peak_hours_follow_clock_offset() {
        let orders = vec![confirmed(ServiceType::Nannies, 10.0, at(8, 22))];
        let dubai = chrono::FixedOffset::east_opt(4 * 3600).unwrap();
        let clock = ReportClock::new(Utc::now().with_timezone(&dubai));

        let hours = Insights::peak_hours(&orders, &clock, 5);

        assert_eq!(hours[0].hour, 2);
    }

    #[test]
    fn test_weekly_patterns_sunday_first() {
        let orders = vec![
            confirmed(ServiceType::Nannies, 30.0, at(9, 9)),
            confirmed(ServiceType::Nannies, 20.0, at(7, 9)),
            confirmed(ServiceType::Nannies, 5.0, at(14, 9)),
        ];

        let days = Insights::weekly_patterns(&orders, &clock());

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].day, "Sunday");
        assert_eq!(days[0].day_index, 0);
        assert_eq!(days[0].order_count, 2);
        assert_eq!(days[0].total_revenue, 25.0);
        assert_eq!(days[1].day, "Tuesday");
    }

    #[test]
    fn test_seasonal_trends_averages() {
        let orders = vec![
            confirmed(ServiceType::Nannies, 100.0, at(8, 9)),
            confirmed(ServiceType::Nannies, 50.0, at(20, 9)),
            confirmed(
                ServiceType::Nannies,
                90.0,
                Utc.with_ymd_and_hms(2023, 12, 1, 9, 0, 0).unwrap(),
            ),
        ];

        let months = Insights::seasonal_trends(&orders, &clock());

        assert_eq!(months.len(), 2);
        assert_eq!(months[0].month, "January");
        assert_eq!(months[0].month_index, 0);
        assert_eq!(months[0].average_order_value, 75.0);
        assert_eq!(months[1].month_index, 11);
    }

    // ========== customers ==========

    #[test]
    fn test_high_value_customers() {
        let base = |total, day| {
            order(
                ServiceType::Nannies,
                total,
                PaymentStatus::Completed,
                RequestStatus::Completed,
                Some(at(day, 9)),
            )
        };
        let orders = vec![
            with_customer(base(100.0, 8), "Sarah Johnson", Some("sarah@example.com")),
            with_customer(base(300.0, 12), "Sarah Johnson", Some("sarah@example.com")),
            with_customer(base(250.0, 10), "Ahmed Hassan", Some("ahmed@example.com")),
            with_customer(
                cancel(base(900.0, 11)),
                "Ahmed Hassan",
                Some("ahmed@example.com"),
            ),
        ];

        let customers = Insights::high_value_customers(&orders, 10);

        assert_eq!(customers.len(), 2);
        assert_eq!(customers[0].id, "sarah@example.com");
        assert_eq!(customers[0].total_spent, 400.0);
        assert_eq!(customers[0].order_count, 2);
        assert_eq!(customers[0].average_order_value, 200.0);
        assert_eq!(customers[0].last_order_date, Some(at(12, 9)));
        assert_eq!(customers[1].total_spent, 250.0);
    }

    #[test]
    fn test_customers_without_email_keyed_by_document() {
        let mut first = confirmed(ServiceType::GearRefresh, 10.0, at(8, 9));
        first.document_id = "abc".into();
        let mut second = confirmed(ServiceType::GearRefresh, 20.0, at(8, 9));
        second.document_id = "def".into();

        let customers = Insights::high_value_customers(&[first, second], 10);

        assert_eq!(customers.len(), 2);
        assert_eq!(customers[0].id, "def");
        assert_eq!(customers[0].name, "Unknown Customer");
        assert_eq!(customers[0].email, None);
    }
}
