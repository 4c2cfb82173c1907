//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to              |
//! |----------------|--------------------|--------------------------|
//! | `hardware`     | SensorPort         | DS18B20 on 1-Wire        |
//! |                | FanPort            | Relay GPIO               |
//! | `log_sink`     | EventSink          | Serial log output        |
//! | `log_display`  | DisplayPort        | Serial log output        |
//! | `mqtt_client`  | MqttTransport      | ESP-IDF MQTT client      |
//! | `time`         | ClockPort          | ESP32 timer + SNTP       |
//! | `wifi`         | ConnectivityPort   | ESP-IDF WiFi STA         |

pub mod hardware;
pub mod log_display;
pub mod log_sink;
pub mod mqtt_client;
pub mod time;
pub mod wifi;
