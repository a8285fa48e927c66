//! ROS 2 adapters: MoveIt 2 as the motion backend, RViz markers as the display
//!
//! Planning and forward kinematics go through the MoveIt services. The
//! planned joint trajectory is handed to the arm controller topic and the
//! call blocks for the trajectory's duration. Service responses are only
//! delivered while the node's executor spins, so these adapters must be
//! used from a thread other than the one spinning.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use futures::channel::oneshot;
use log::{debug, info};
use nalgebra::{Quaternion, UnitQuaternion};
use rclrs::{Client, Node, Publisher, QOS_PROFILE_DEFAULT};

use builtin_interfaces::msg::Time;
use geometry_msgs::msg::{Point as PointMsg, Pose as PoseMsg, Quaternion as QuaternionMsg};
use moveit_msgs::msg::{MoveItErrorCodes, RobotTrajectory};
use moveit_msgs::srv::{
    GetCartesianPath, GetCartesianPath_Request, GetPositionFK, GetPositionFK_Request,
};
use std_msgs::msg::{ColorRGBA, Header};
use trajectory_msgs::msg::JointTrajectory;
use visualization_msgs::msg::Marker as MarkerMsg;

use crate::common::types::{Point, Pose};
use crate::config::RosSection;
use crate::error::{BackendError, DisplayError};
use crate::trajectory::{CartesianPlan, MotionBackend};
use crate::visualization::{DisplayChannel, Marker, MarkerAction, MarkerKind};

const RESPONSE_POLL: Duration = Duration::from_millis(10);

/// MoveIt 2 backed arm
pub struct RosMotionBackend {
    cartesian_client: Arc<Client<GetCartesianPath>>,
    fk_client: Arc<Client<GetPositionFK>>,
    trajectory_publisher: Arc<Publisher<JointTrajectory>>,
    planning_group: String,
    end_effector_link: String,
    base_frame: String,
    timeout: Duration,
}

impl RosMotionBackend {
    /// Create the service clients and the controller publisher, then wait for
    /// the MoveIt services to come up.
    pub fn connect(node: &Arc<Node>, ros: &RosSection) -> Result<Self, BackendError> {
        let cartesian_client = node
            .create_client::<GetCartesianPath>(&ros.cartesian_path_service)
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;
        let fk_client = node
            .create_client::<GetPositionFK>(&ros.fk_service)
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;
        let trajectory_publisher = node
            .create_publisher::<JointTrajectory>(&ros.trajectory_topic, QOS_PROFILE_DEFAULT)
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;

        let timeout = ros.service_timeout();
        wait_for_service(&ros.cartesian_path_service, timeout, || {
            cartesian_client.service_is_ready()
        })?;
        wait_for_service(&ros.fk_service, timeout, || fk_client.service_is_ready())?;
        info!(
            "Connected to MoveIt (group {}, link {})",
            ros.planning_group, ros.end_effector_link
        );

        Ok(RosMotionBackend {
            cartesian_client,
            fk_client,
            trajectory_publisher,
            planning_group: ros.planning_group.clone(),
            end_effector_link: ros.end_effector_link.clone(),
            base_frame: ros.base_frame.clone(),
            timeout,
        })
    }

    fn header(&self) -> Header {
        Header {
            frame_id: self.base_frame.clone(),
            ..Default::default()
        }
    }
}

impl MotionBackend for RosMotionBackend {
    type Plan = RobotTrajectory;

    fn current_pose(&mut self) -> Result<Pose, BackendError> {
        let mut request = GetPositionFK_Request {
            header: self.header(),
            fk_link_names: vec![self.end_effector_link.clone()],
            ..Default::default()
        };
        // an empty diff state means "the current state" to MoveIt
        request.robot_state.is_diff = true;

        let promise = self
            .fk_client
            .call(&request)
            .map_err(|e| BackendError::Request(e.to_string()))?;
        let response = await_response(promise, self.timeout)?;

        check_error_code("forward kinematics", &response.error_code)?;
        response
            .pose_stamped
            .first()
            .map(|stamped| pose_from_msg(&stamped.pose))
            .ok_or_else(|| {
                BackendError::Request(format!("no pose for link {}", self.end_effector_link))
            })
    }

    fn plan_cartesian_path(
        &mut self,
        waypoints: &[Pose],
        max_step: f64,
        jump_threshold: f64,
    ) -> Result<CartesianPlan<RobotTrajectory>, BackendError> {
        let mut request = GetCartesianPath_Request {
            header: self.header(),
            group_name: self.planning_group.clone(),
            link_name: self.end_effector_link.clone(),
            waypoints: waypoints.iter().map(pose_to_msg).collect(),
            max_step,
            jump_threshold,
            avoid_collisions: true,
            ..Default::default()
        };
        request.start_state.is_diff = true;

        let promise = self
            .cartesian_client
            .call(&request)
            .map_err(|e| BackendError::Request(e.to_string()))?;
        let response = await_response(promise, self.timeout)?;

        if response.error_code.val != MoveItErrorCodes::SUCCESS {
            debug!(
                "Cartesian planning returned error code {}",
                response.error_code.val
            );
        }
        Ok(CartesianPlan {
            plan: response.solution,
            fraction: response.fraction,
        })
    }

    /// Fire and wait: the controller topic gives no result back, so a sent
    /// trajectory always reports success and `ExecutionOutcome::Aborted`
    /// never happens over ROS. Only an empty trajectory reports `false`.
    fn execute(&mut self, plan: &RobotTrajectory) -> Result<bool, BackendError> {
        let trajectory = &plan.joint_trajectory;
        let Some(last) = trajectory.points.last() else {
            return Ok(false);
        };
        let duration = Duration::new(
            last.time_from_start.sec.max(0) as u64,
            last.time_from_start.nanosec,
        );

        self.trajectory_publisher
            .publish(trajectory)
            .map_err(|e| BackendError::Request(e.to_string()))?;
        debug!(
            "Sent {} trajectory points, waiting {:.2}s",
            trajectory.points.len(),
            duration.as_secs_f64()
        );
        thread::sleep(duration);
        Ok(true)
    }
}

/// Publishes markers on the RViz marker topic
pub struct RosMarkerDisplay {
    node: Arc<Node>,
    publisher: Arc<Publisher<MarkerMsg>>,
}

impl RosMarkerDisplay {
    /// Create the marker publisher
    pub fn connect(node: &Arc<Node>, ros: &RosSection) -> Result<Self, BackendError> {
        let publisher = node
            .create_publisher::<MarkerMsg>(&ros.marker_topic, QOS_PROFILE_DEFAULT)
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;

        Ok(RosMarkerDisplay {
            node: Arc::clone(node),
            publisher,
        })
    }

    fn now(&self) -> Time {
        let nsec = self.node.get_clock().now().nsec;
        Time {
            sec: (nsec / 1_000_000_000) as i32,
            nanosec: (nsec % 1_000_000_000) as u32,
        }
    }
}

impl DisplayChannel for RosMarkerDisplay {
    fn publish(&mut self, marker: &Marker) -> Result<(), DisplayError> {
        let mut msg = marker_to_msg(marker);
        msg.header.stamp = self.now();

        self.publisher.publish(&msg).map_err(|e| DisplayError {
            id: marker.id,
            reason: e.to_string(),
        })
    }
}

fn wait_for_service(
    name: &str,
    timeout: Duration,
    is_ready: impl Fn() -> Result<bool, rclrs::RclrsError>,
) -> Result<(), BackendError> {
    // no deadline when the timeout is too large to represent
    let deadline = Instant::now().checked_add(timeout);
    loop {
        if is_ready().map_err(|e| BackendError::Unavailable(e.to_string()))? {
            return Ok(());
        }
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(BackendError::Unavailable(format!(
                "service {} not ready after {:.1}s",
                name,
                timeout.as_secs_f64()
            )));
        }
        thread::sleep(Duration::from_millis(100));
    }
}

fn await_response<T>(
    mut promise: oneshot::Receiver<T>,
    timeout: Duration,
) -> Result<T, BackendError> {
    let deadline = Instant::now().checked_add(timeout);
    loop {
        match promise.try_recv() {
            Ok(Some(response)) => return Ok(response),
            Ok(None) if deadline.map_or(true, |deadline| Instant::now() < deadline) => {
                thread::sleep(RESPONSE_POLL)
            }
            Ok(None) => {
                return Err(BackendError::Request(format!(
                    "no response after {:.1}s",
                    timeout.as_secs_f64()
                )))
            }
            Err(_) => {
                return Err(BackendError::Unavailable(
                    "request dropped before a response arrived".to_string(),
                ))
            }
        }
    }
}

fn check_error_code(what: &str, code: &MoveItErrorCodes) -> Result<(), BackendError> {
    if code.val == MoveItErrorCodes::SUCCESS {
        Ok(())
    } else {
        Err(BackendError::Request(format!(
            "{} failed with MoveIt error code {}",
            what, code.val
        )))
    }
}

fn point_to_msg(point: &Point) -> PointMsg {
    PointMsg {
        x: point.x,
        y: point.y,
        z: point.z,
    }
}

fn pose_to_msg(pose: &Pose) -> PoseMsg {
    let q = pose.orientation.quaternion();
    PoseMsg {
        position: point_to_msg(&pose.position),
        orientation: QuaternionMsg {
            x: q.i,
            y: q.j,
            z: q.k,
            w: q.w,
        },
    }
}

fn pose_from_msg(msg: &PoseMsg) -> Pose {
    let o = &msg.orientation;
    Pose::new(
        Point::new(msg.position.x, msg.position.y, msg.position.z),
        UnitQuaternion::from_quaternion(Quaternion::new(o.w, o.x, o.y, o.z)),
    )
}

fn marker_to_msg(marker: &Marker) -> MarkerMsg {
    let mut msg = MarkerMsg::default();
    msg.header.frame_id = marker.frame_id.clone();
    msg.id = marker.id;
    msg.type_ = match marker.kind {
        MarkerKind::LineStrip => MarkerMsg::LINE_STRIP,
    };
    msg.action = match marker.action {
        MarkerAction::Add => MarkerMsg::ADD,
    };
    msg.scale.x = marker.line_width;
    msg.color = ColorRGBA {
        r: marker.color.r,
        g: marker.color.g,
        b: marker.color.b,
        a: marker.color.a,
    };
    let q = marker.orientation.quaternion();
    msg.pose.orientation = QuaternionMsg {
        x: q.i,
        y: q.j,
        z: q.k,
        w: q.w,
    };
    msg.points = marker.points.iter().map(point_to_msg).collect();
    msg
}
